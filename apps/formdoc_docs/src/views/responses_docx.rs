use axum::{extract::State, response::Response};
use formdoc_core::http::{bad, ApiResult, JsonBody};
use serde_json::Value;
use tracing::debug;

use crate::formatter;
use crate::{DocsState, FlattenSource};

use super::{attachment, render};

pub async fn generate_responses_docx(
    State(state): State<DocsState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    if !body.is_object() {
        return Err(bad("request body must be a JSON object"));
    }
    debug!(source = ?state.responses_source, "generate_responses_docx");

    let block = match state.responses_source {
        FlattenSource::Responses => body
            .get("responses")
            .map(formatter::key_value)
            .unwrap_or_default(),
        FlattenSource::WholePayload => formatter::key_value(&body),
    };
    let bytes = render(state.responses, block).await?;
    Ok(attachment(bytes))
}
