use serde_json::Value;

/// Performs a deep equality check between two JSON values.
///
/// Arrays compare element-by-element, objects key-by-key; key order is
/// irrelevant for objects. Numbers compare by `serde_json::Number` equality.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use propeller_util::deep_equal;
///
/// let a = json!({"keys": [["Na", "Ascending"]]});
/// let b = json!({"keys": [["Na", "Ascending"]]});
/// let c = json!({"keys": [["Na", "Descending"]]});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| deep_equal(v, w)))
        }
        _ => false,
    }
}
