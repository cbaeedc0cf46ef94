use serde::{Deserialize, Serialize};

use crate::models::contact_record::ContactRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactIn {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub additional_info: String,
}

impl From<ContactIn> for ContactRecord {
    fn from(inp: ContactIn) -> Self {
        ContactRecord {
            full_name: inp.full_name,
            email: inp.email,
            phone: inp.phone,
            additional_info: inp.additional_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactOut {
    pub result: &'static str,
}
