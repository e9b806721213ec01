//! JSON-Patch body normalization for PATCH endpoints

use crate::domain::{CpqError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One wire-format patch entry
///
/// `from` and `value` are omitted from the serialized form when they were not
/// supplied. An explicit `null` value is kept, since `replace` with `null` is
/// meaningful to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn new(op: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            path: path.into(),
            from: None,
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(Value::String(from.into()));
        self
    }
}

/// Distinguishes an explicit `null` from a missing key
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Normalize loosely-shaped patch descriptors
///
/// Anything other than an array yields an empty patch. Elements that are not
/// objects are dropped; missing `op`/`path` become empty strings. The op
/// value itself is not validated.
pub fn build_patch(input: &Value) -> Vec<PatchOperation> {
    let Some(entries) = input.as_array() else {
        if !input.is_null() {
            tracing::debug!("Patch input is not an array, sending an empty patch");
        }
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(fields) = entry.as_object() else {
                tracing::warn!(index = index, "Skipping patch entry that is not an object");
                return None;
            };

            Some(PatchOperation {
                op: text_field(fields.get("op")),
                path: text_field(fields.get("path")),
                from: fields.get("from").cloned(),
                value: fields.get("value").cloned(),
            })
        })
        .collect()
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parse caller-supplied patch text and normalize it
///
/// Blank text is an empty patch.
///
/// # Errors
///
/// Returns `CpqError::Validation` when the text is not valid JSON.
pub fn parse_patch_document(text: &str) -> Result<Vec<PatchOperation>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| CpqError::Validation(format!("Patch operations are not valid JSON: {e}")))?;
    Ok(build_patch(&value))
}

/// Serialize a normalized patch as the request body
pub fn to_body(operations: &[PatchOperation]) -> Result<Value> {
    Ok(serde_json::to_value(operations)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_passes_through() {
        let patch = build_patch(&json!([{"op": "replace", "path": "/quantity", "value": 2}]));
        assert_eq!(
            to_body(&patch).unwrap(),
            json!([{"op": "replace", "path": "/quantity", "value": 2}])
        );
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(build_patch(&json!("not-an-array")).is_empty());
        assert!(build_patch(&json!({"op": "add"})).is_empty());
        assert!(build_patch(&Value::Null).is_empty());
    }

    #[test]
    fn test_absent_fields_are_not_emitted() {
        let patch = build_patch(&json!([{"op": "remove", "path": "/notes"}]));
        assert_eq!(to_body(&patch).unwrap(), json!([{"op": "remove", "path": "/notes"}]));
    }

    #[test]
    fn test_explicit_null_value_is_kept() {
        let patch = build_patch(&json!([{"op": "replace", "path": "/notes", "value": null}]));
        assert_eq!(patch[0].value, Some(Value::Null));
        assert_eq!(
            to_body(&patch).unwrap(),
            json!([{"op": "replace", "path": "/notes", "value": null}])
        );
    }

    #[test]
    fn test_move_keeps_from_and_drops_extra_keys() {
        let patch = build_patch(&json!([
            {"op": "move", "from": "/a", "path": "/b", "extra": true},
            42
        ]));
        assert_eq!(patch, vec![PatchOperation::new("move", "/b").with_from("/a")]);
    }

    #[test]
    fn test_parse_patch_document() {
        assert!(parse_patch_document("  ").unwrap().is_empty());
        assert_eq!(parse_patch_document(r#"[{"op":"add","path":"/x","value":1}]"#).unwrap().len(), 1);
        assert!(matches!(
            parse_patch_document("[{"),
            Err(CpqError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_operation_deserializes_null_value() {
        let op: PatchOperation =
            serde_json::from_value(json!({"op": "replace", "path": "/x", "value": null})).unwrap();
        assert_eq!(op.value, Some(Value::Null));

        let op: PatchOperation = serde_json::from_value(json!({"op": "remove", "path": "/x"})).unwrap();
        assert_eq!(op.value, None);
    }
}
