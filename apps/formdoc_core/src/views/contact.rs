use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::http::{bad, ApiResult, JsonBody};
use crate::models::contact_record::ContactRecord;
use crate::serializers::contact::{ContactIn, ContactOut};
use crate::CoreState;

pub async fn contact(
    State(state): State<CoreState>,
    JsonBody(inp): JsonBody<ContactIn>,
) -> ApiResult<Json<ContactOut>> {
    debug!(full_name = %inp.full_name, email = %inp.email, "contact form received");

    let record = ContactRecord::from(inp);
    state.contacts.write(&record).await.map_err(bad)?;
    info!(path = %state.contacts.path().display(), "contact record written");

    Ok(Json(ContactOut {
        result: "CSV file created successfully",
    }))
}
