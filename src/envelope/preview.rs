//! Diagnostic previews of ciphertext-like values
//!
//! Every warning and classification failure in the envelope module carries a
//! short, truncated description of the offending value so that malformed SDK
//! output can be diagnosed from logs without dumping whole ciphertexts.

use serde_json::Value;

/// Maximum number of characters kept from any stringified fragment
const PREVIEW_LEN: usize = 96;

/// Maximum number of leading elements shown for arrays
const PREVIEW_ELEMS: usize = 8;

/// Render a short diagnostic description of an arbitrary JSON value.
///
/// The output states the value's type and size and shows a truncated
/// fragment of its content. It is intended for log lines and error
/// payloads, never for round-tripping.
pub fn preview(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool({})", b),
        Value::Number(n) => format!("number({})", n),
        Value::String(s) => format!("string(len={}) {}", s.len(), truncate(s)),
        Value::Array(items) => {
            let head: Vec<String> = items
                .iter()
                .take(PREVIEW_ELEMS)
                .map(|v| match v {
                    Value::Number(n) => n.to_string(),
                    other => type_name(other).to_string(),
                })
                .collect();
            format!(
                "array(len={}) first={} preview=[{}]",
                items.len(),
                items.first().map(type_name).unwrap_or("none"),
                head.join(",")
            )
        }
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!(
                "object keys={}",
                truncate(&keys.join(","))
            )
        }
    }
}

/// JSON type name used in previews
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truncate a string to the preview budget, marking elision
fn truncate(s: &str) -> String {
    if s.chars().count() <= PREVIEW_LEN {
        s.to_string()
    } else {
        let head: String = s.chars().take(PREVIEW_LEN).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_null() {
        assert_eq!(preview(&Value::Null), "null");
    }

    #[test]
    fn test_preview_number() {
        assert_eq!(preview(&json!(42)), "number(42)");
    }

    #[test]
    fn test_preview_string_truncated() {
        let long = "x".repeat(200);
        let p = preview(&json!(long));
        assert!(p.starts_with("string(len=200)"));
        assert!(p.ends_with('…'));
        assert!(p.len() < 150);
    }

    #[test]
    fn test_preview_array() {
        let p = preview(&json!([1, 2, 3]));
        assert_eq!(p, "array(len=3) first=number preview=[1,2,3]");
    }

    #[test]
    fn test_preview_array_of_objects() {
        let p = preview(&json!([{ "a": 1 }]));
        assert_eq!(p, "array(len=1) first=object preview=[object]");
    }

    #[test]
    fn test_preview_object_lists_keys() {
        let p = preview(&json!({ "handles": [], "inputProof": "0x" }));
        assert!(p.starts_with("object keys="));
        assert!(p.contains("handles"));
        assert!(p.contains("inputProof"));
    }
}
