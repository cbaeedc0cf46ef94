use axum::{extract::State, response::Response};
use formdoc_core::http::{bad, ApiResult, JsonBody};
use serde_json::Value;
use tracing::debug;

use crate::formatter;
use crate::serializers::items_docx::ItemsDocxIn;
use crate::DocsState;

use super::{attachment, render};

pub async fn generate_docx(
    State(state): State<DocsState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    // serde would fill the struct from an array by position
    if !body.is_object() {
        return Err(bad("request body must be a JSON object"));
    }
    let inp: ItemsDocxIn = serde_json::from_value(body).map_err(bad)?;
    debug!(title = %inp.title, items = %inp.items, "generate_docx");

    let block = formatter::itemized(&inp.items).map_err(bad)?;
    let bytes = render(state.items, block).await?;
    Ok(attachment(bytes))
}
