use axum::Json;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::http::{bad, ApiResult, JsonBody};
use crate::serializers::double_number::{DoubleNumberIn, DoubleNumberOut};

#[derive(Debug, Error, PartialEq)]
pub enum NumberError {
    #[error("number must be numeric, got {0}")]
    NotNumeric(&'static str),

    #[error("doubling {0} overflows")]
    Overflow(f64),
}

pub async fn double_number(
    JsonBody(inp): JsonBody<DoubleNumberIn>,
) -> ApiResult<Json<DoubleNumberOut>> {
    let result = double(&inp.number).map_err(bad)?;
    debug!(number = %inp.number, %result, "doubled");
    Ok(Json(DoubleNumberOut { result }))
}

/// Integers stay integers until they overflow, then fall back to floats.
pub fn double(value: &Value) -> Result<Value, NumberError> {
    let Value::Number(n) = value else {
        return Err(NumberError::NotNumeric(kind(value)));
    };

    if let Some(doubled) = n.as_i64().and_then(|i| i.checked_mul(2)) {
        return Ok(Value::from(doubled));
    }
    if let Some(doubled) = n.as_u64().and_then(|u| u.checked_mul(2)) {
        return Ok(Value::from(doubled));
    }

    let Some(f) = n.as_f64() else {
        return Err(NumberError::NotNumeric(kind(value)));
    };
    Number::from_f64(f * 2.0)
        .map(Value::Number)
        .ok_or(NumberError::Overflow(f))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
