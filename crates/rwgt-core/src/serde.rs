//! Key-sorted JSON rendering for reports and content hashes.

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorInfo, RwgtError};

fn encode_error(err: serde_json::Error) -> RwgtError {
    RwgtError::Serde(ErrorInfo::new("json-encode", err.to_string()))
}

/// Rebuilds every object with its keys in lexicographic order, so the
/// rendering does not depend on struct field order or map insertion order.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        leaf => leaf,
    }
}

fn sorted_value<T: Serialize>(value: &T) -> Result<Value, RwgtError> {
    serde_json::to_value(value).map(sorted).map_err(encode_error)
}

/// Compact key-sorted JSON, the input of [`crate::stable_hash_string`].
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, RwgtError> {
    serde_json::to_vec(&sorted_value(value)?).map_err(encode_error)
}

/// Indented key-sorted JSON for terminals and report files.
pub fn to_pretty_json_string<T: Serialize>(value: &T) -> Result<String, RwgtError> {
    serde_json::to_string_pretty(&sorted_value(value)?).map_err(encode_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_are_sorted() {
        let bytes = to_canonical_json_bytes(&json!({"b": 1, "a": {"z": [ {"y": 0, "x": 1} ], "c": 2}}))
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"c":2,"z":[{"x":1,"y":0}]},"b":1}"#
        );
    }
}
