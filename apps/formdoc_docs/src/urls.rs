use axum::Router;
use formdoc_core::http::post_only;

use crate::views::{items_docx::generate_docx, responses_docx::generate_responses_docx};
use crate::DocsState;

pub fn router(state: DocsState) -> Router {
    Router::new()
        .route("/generate-docx/", post_only(generate_docx))
        .route("/generate-responses-docx/", post_only(generate_responses_docx))
        .with_state(state)
}
