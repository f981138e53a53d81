use serde_json::Number;

use super::{Map, Value};

/// Performs a deep equality check between two values.
///
/// Lists compare element by element, in order. Maps compare key by key,
/// ignoring key order. Numbers compare by numeric value, so `1` equals `1.0`.
/// Identical nodes short-circuit without descending.
///
/// # Examples
///
/// ```
/// use pathstore::value::{deep_equal, Value};
/// use serde_json::json;
///
/// let a = Value::from(json!({"foo": [1, 2, 3]}));
/// let b = Value::from(json!({"foo": [1, 2, 3]}));
/// let c = Value::from(json!({"foo": [1, 2, 4]}));
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::List(list_a), Value::List(list_b)) => {
            if std::sync::Arc::ptr_eq(list_a, list_b) {
                return true;
            }
            list_a.len() == list_b.len()
                && list_a.iter().zip(list_b.iter()).all(|(x, y)| deep_equal(x, y))
        }

        (Value::Map(map_a), Value::Map(map_b)) => {
            std::sync::Arc::ptr_eq(map_a, map_b) || map_equal(map_a, map_b)
        }

        // Different types are never equal
        _ => false,
    }
}

/// Deep equality of two map nodes, ignoring key order.
pub fn map_equal(a: &Map, b: &Map) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(key, val_a)| match b.get(key) {
        Some(val_b) => deep_equal(val_a, val_b),
        None => false,
    })
}

fn number_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
