use serde_json::Value;

use crate::{decode, Path, PathError};

/// Decode a path carried inside a JSON document.
///
/// Accepts a string (split on `.`) or an array whose elements are strings or
/// non-negative integers (list indices). Anything else is rejected.
///
/// # Example
///
/// ```
/// use pathstore_path::decode_value;
/// use serde_json::json;
///
/// assert_eq!(decode_value(&json!("todos.0")).unwrap(), vec!["todos", "0"]);
/// assert_eq!(decode_value(&json!(["todos", 0])).unwrap(), vec!["todos", "0"]);
/// assert!(decode_value(&json!(42)).is_err());
/// ```
pub fn decode_value(path: &Value) -> Result<Path, PathError> {
    match path {
        Value::String(s) => Ok(decode(s.as_str())),
        Value::Array(items) => items.iter().map(decode_segment).collect(),
        other => Err(PathError::Malformed {
            found: type_name(other),
        }),
    }
}

fn decode_segment(segment: &Value) -> Result<String, PathError> {
    match segment {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => n
            .as_u64()
            .map(|i| i.to_string())
            .ok_or(PathError::Malformed {
                found: "non-integer number segment",
            }),
        other => Err(PathError::Malformed {
            found: type_name(other),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
