use axum::Router;

use crate::http::post_only;
use crate::views::{contact::contact, double_number::double_number};
use crate::CoreState;

pub fn router(state: CoreState) -> Router {
    Router::new()
        .route("/double-number/", post_only(double_number))
        .route("/contact/", post_only(contact))
        .with_state(state)
}
