//! Flattens form payloads into the text block that replaces the placeholder.
//!
//! Two layouts:
//!
//! ```text
//! itemized                 key-value
//! Drone:                   Main tasks: Mapping, Monitoring
//!   - autopilot            Flight duration: 30 min
//!   - camera
//!
//! ```
//!
//! Output is untrimmed; the template filler trims before substituting.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("item {index} has no '{field}' field")]
    MissingField { index: usize, field: &'static str },
}

/// `name:` then `  - component` per component, then a blank line, per item.
pub fn itemized(items: &Value) -> Result<String, FormatError> {
    let list = match items {
        Value::Null => return Ok(String::new()),
        Value::Array(list) => list,
        other => return Ok(format!("{}\n", value_str(other))),
    };

    let mut out = String::new();
    for (index, item) in list.iter().enumerate() {
        let Value::Object(fields) = item else {
            out.push_str(&format!("{}\n\n", value_str(item)));
            continue;
        };
        let name = fields
            .get("name")
            .ok_or(FormatError::MissingField { index, field: "name" })?;
        let components = fields
            .get("components")
            .ok_or(FormatError::MissingField { index, field: "components" })?;

        out.push_str(&format!("{}:\n", value_str(name)));
        match components {
            Value::Array(components) => {
                for component in components {
                    out.push_str(&format!("  - {}\n", value_str(component)));
                }
            }
            Value::Null => {}
            single => out.push_str(&format!("  - {}\n", value_str(single))),
        }
        out.push('\n');
    }
    Ok(out)
}

/// One `key: value` line per entry, in payload order.
pub fn key_value(responses: &Value) -> String {
    match responses {
        Value::Null => String::new(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}\n", render(value)))
            .collect(),
        other => format!("{}\n", value_str(other)),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Array(list) => flatten_list(list),
        other => value_str(other),
    }
}

/// Comma-containing strings count as several answers; everything is joined
/// with `", "`.
pub fn flatten_list(list: &[Value]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(list.len());
    for value in list {
        match value {
            Value::String(s) if s.contains(',') => parts.extend(s.split(',').map(str::to_owned)),
            other => parts.push(value_str(other)),
        }
    }
    parts.join(", ")
}

/// Strings verbatim, `null` as nothing, everything else as JSON text.
pub fn value_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
