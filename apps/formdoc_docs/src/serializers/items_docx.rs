use serde::Deserialize;
use serde_json::Value;

/// `{ "title": ..., "items": [{"name": ..., "components": [...]}] }`
///
/// Both fields stay loosely typed; the formatter decides what each shape means.
#[derive(Debug, Deserialize)]
pub struct ItemsDocxIn {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub items: Value,
}
