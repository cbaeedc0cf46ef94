//! Request/response plumbing shared by every app.
//!
//! Form endpoints accept any body that parses as JSON (the frontend does not
//! always send `Content-Type: application/json`), answer failures with
//! `{"error": "..."}` and reject anything but POST with a JSON 405.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    handler::Handler,
    http::StatusCode,
    routing::{post, MethodRouter},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::serializers::api::ApiError;

pub type ApiFailure = (StatusCode, Json<ApiError>);
pub type ApiResult<T> = Result<T, ApiFailure>;

pub const INVALID_METHOD: &str = "Invalid request method";

/// JSON body extractor that reports parse errors in the `ApiError` envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| bad(rejection.body_text()))?;
        serde_json::from_slice(&body).map(JsonBody).map_err(bad)
    }
}

/// POST route whose other methods get the JSON 405 instead of axum's empty one.
pub fn post_only<H, T, S>(handler: H) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    post(handler).fallback(method_not_allowed)
}

pub async fn method_not_allowed() -> ApiFailure {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiError {
            error: INVALID_METHOD.into(),
        }),
    )
}

pub async fn not_found() -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "not found".into(),
        }),
    )
}

// every handler failure is a client error carrying the underlying message
pub fn bad<E: std::fmt::Display>(e: E) -> ApiFailure {
    let error = e.to_string();
    warn!(%error, "request failed");
    (StatusCode::BAD_REQUEST, Json(ApiError { error }))
}
