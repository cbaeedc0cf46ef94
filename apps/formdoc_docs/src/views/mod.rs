pub mod items_docx;
pub mod responses_docx;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use formdoc_core::http::{bad, ApiResult};
use tracing::info;

use crate::docx::{TemplateFiller, DOCX_MIME};

/// Fill `filler`'s template off the async runtime and serialize the result.
pub(crate) async fn render(filler: TemplateFiller, block: String) -> ApiResult<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || filler.fill(&block)?.to_bytes())
        .await
        .map_err(bad)?
        .map_err(bad)?;
    Ok(bytes)
}

pub(crate) fn attachment(bytes: Vec<u8>) -> Response {
    info!(bytes = bytes.len(), "document generated");
    (
        [
            (header::CONTENT_TYPE, DOCX_MIME),
            (header::CONTENT_DISPOSITION, "attachment; filename=output.docx"),
        ],
        bytes,
    )
        .into_response()
}
