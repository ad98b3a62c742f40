//! Path-expression field extraction
//!
//! The harness reads single fields of live resources for change
//! detection (`{.metadata.resourceVersion}` before and after a
//! disruption). Expressions are the kubectl jsonpath subset the
//! scenarios actually use: a dotted path, optionally wrapped in braces,
//! with numeric segments indexing into arrays.

use serde_json::Value;

/// Look up a field of a JSON document by path expression
///
/// Accepts `{.spec.replicas}`, `.spec.replicas` and `spec.replicas`
/// interchangeably. Returns `None` when any segment is missing.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use snapcheck::context::field_path;
///
/// let doc = json!({"metadata": {"resourceVersion": "12345"}});
/// let rv = field_path(&doc, "{.metadata.resourceVersion}");
/// assert_eq!(rv.and_then(|v| v.as_str()), Some("12345"));
/// ```
pub fn field_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let trimmed = path
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_start_matches('.');

    let mut current = value;
    for segment in trimmed.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a field the way a jsonpath query prints it
///
/// Strings come back unquoted, scalars via their JSON form, and a
/// missing or null field is the empty string - which is what the
/// replica-count comparison relies on for absent `availableReplicas`.
pub fn render_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_path_formats() {
        let doc = json!({"spec": {"replicas": 2}});

        // All three accepted spellings resolve the same field
        assert_eq!(field_path(&doc, "{.spec.replicas}"), Some(&json!(2)));
        assert_eq!(field_path(&doc, ".spec.replicas"), Some(&json!(2)));
        assert_eq!(field_path(&doc, "spec.replicas"), Some(&json!(2)));
    }

    #[test]
    fn test_field_path_missing_segment() {
        let doc = json!({"spec": {"replicas": 2}});

        assert_eq!(field_path(&doc, "{.spec.selector}"), None);
        assert_eq!(field_path(&doc, "{.status.availableReplicas}"), None);
    }

    #[test]
    fn test_field_path_array_index() {
        let doc = json!({"items": [{"name": "a"}, {"name": "b"}]});

        assert_eq!(field_path(&doc, "{.items.1.name}"), Some(&json!("b")));
        assert_eq!(field_path(&doc, "{.items.2.name}"), None);
        assert_eq!(field_path(&doc, "{.items.x.name}"), None);
    }

    #[test]
    fn test_field_path_non_object_leaf() {
        let doc = json!({"metadata": {"name": "webhook"}});

        // Descending through a string is not possible
        assert_eq!(field_path(&doc, "{.metadata.name.sub}"), None);
    }

    #[test]
    fn test_render_field() {
        assert_eq!(render_field(Some(&json!("12345"))), "12345");
        assert_eq!(render_field(Some(&json!(2))), "2");
        assert_eq!(render_field(Some(&json!(true))), "true");
        assert_eq!(render_field(Some(&Value::Null)), "");
        assert_eq!(render_field(None), "");
    }
}
