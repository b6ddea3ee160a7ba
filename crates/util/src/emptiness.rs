use serde_json::Value;

/// Returns `true` when a string is empty or contains only whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Returns `true` when a JSON value counts as "no content".
///
/// `null` is empty, strings are empty when zero-length (or whitespace-only
/// when `trim_spaces` is set), arrays and objects are empty when they hold
/// no elements. Numbers and booleans always count as content.
pub fn value_is_empty(value: &Value, trim_spaces: bool) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            if trim_spaces {
                is_blank(s)
            } else {
                s.is_empty()
            }
        }
        Value::Array(arr) => arr.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
