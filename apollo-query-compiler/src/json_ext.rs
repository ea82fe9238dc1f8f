//! JSON helpers used by compiled operations at invocation time.
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

/// A JSON object.
pub type Object = Map<ByteString, Value>;

/// Truthiness as applied by a compiled object scope to decide whether to descend.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::Null => false,
        Value::String(s) => !s.as_str().is_empty(),
        Value::Object(_) | Value::Array(_) => true,
    }
}

/// Reads `source[key]` following the default resolution contract.
///
/// A missing key or a source that is not an object reads as `null`.
pub(crate) fn read_property(source: &Value, key: &str) -> Value {
    match source {
        Value::Object(object) => object.get(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Shallow merge of a resolved object value with the selection computed for it.
///
/// Own properties of `value` come first and selected properties override them.
/// Properties that were not selected are kept.
pub(crate) fn shallow_merge(value: Value, selection: Object) -> Value {
    match value {
        Value::Object(mut merged) => {
            for (key, selected) in selection {
                merged.insert(key, selected);
            }
            Value::Object(merged)
        }
        _ => Value::Object(selection),
    }
}
