use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct DoubleNumberIn {
    #[serde(default = "zero")]
    pub number: Value,
}

#[derive(Debug, Serialize)]
pub struct DoubleNumberOut {
    pub result: Value,
}

fn zero() -> Value {
    Value::from(0)
}
