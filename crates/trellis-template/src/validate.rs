//! Static checking of template references.
//!
//! Runs when a workflow step is created or edited, before any context exists:
//! every `{{path}}` in the step configuration must name a field that will be
//! available at run time. A path is available when it equals a declared field
//! or descends from one (`contact.email` is covered by `contact`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::token_paths;
use crate::path::normalize;

/// Outcome of validating a configuration against available fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when every referenced path is available.
    pub valid: bool,
    /// Unavailable paths, deduplicated, in first-seen order.
    pub missing_fields: Vec<String>,
}

impl ValidationResult {
    fn from_missing(missing_fields: Vec<String>) -> Self {
        Self {
            valid: missing_fields.is_empty(),
            missing_fields,
        }
    }
}

/// Collect the unique `{{...}}` paths referenced in `s`, in first-seen order.
pub fn extract_variables(s: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for path in token_paths(s) {
        push_unique(&mut paths, path);
    }
    paths
}

/// Collect every path referenced anywhere in a JSON value tree.
pub fn extract_from_value(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect(value, &mut paths);
    paths
}

fn collect(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for path in token_paths(s) {
                push_unique(out, path);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect(item, out)),
        _ => {}
    }
}

fn push_unique(out: &mut Vec<String>, path: &str) {
    if !out.iter().any(|p| p == path) {
        out.push(path.to_string());
    }
}

/// Returns true if `path` equals or descends from one of `available`.
///
/// Both sides are compared in normalized form, so `items[0].email` is
/// covered by `items`.
pub fn is_available<S: AsRef<str>>(path: &str, available: &[S]) -> bool {
    let path = normalize(path);
    available.iter().any(|field| {
        let field = normalize(field.as_ref());
        path == field
            || path
                .strip_prefix(field.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Check every template reference in `config` against `available` fields.
pub fn validate<S: AsRef<str>>(config: &Value, available: &[S]) -> ValidationResult {
    validate_paths(extract_from_value(config), available)
}

/// Check an explicit list of referenced paths against `available` fields.
pub fn validate_paths<S: AsRef<str>>(
    paths: impl IntoIterator<Item = String>,
    available: &[S],
) -> ValidationResult {
    let mut missing = Vec::new();
    for path in paths {
        if !is_available(&path, available) {
            push_unique(&mut missing, &path);
        }
    }
    ValidationResult::from_missing(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_variables_unique_and_ordered() {
        let vars = extract_variables("{{b}} {{ a }} {{b}} {{c.d[0]}}");
        assert_eq!(vars, vec!["b", "a", "c.d[0]"]);
    }

    #[test]
    fn test_extract_variables_none() {
        assert!(extract_variables("no tokens { here }").is_empty());
    }

    #[test]
    fn test_missing_field_flagged() {
        let available = ["contact.email", "contact.first_name"];
        let result = validate(&json!("Hi {{contact.nonexistent_field}}"), &available);
        assert!(!result.valid);
        assert_eq!(result.missing_fields, vec!["contact.nonexistent_field"]);
    }

    #[test]
    fn test_available_field_accepted() {
        let available = ["contact.email", "contact.first_name"];
        let result = validate(&json!("Mail {{contact.email}}"), &available);
        assert!(result.valid);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn test_descendant_of_available_prefix() {
        let available = ["contact", "steps"];
        assert!(is_available("contact.email", &available));
        assert!(is_available("steps.draft.output.body", &available));
        assert!(is_available("contact", &available));
        assert!(!is_available("contacts.email", &available));
    }

    #[test]
    fn test_bracket_paths_normalized() {
        let available = ["items"];
        assert!(is_available("items[0].email", &available));
    }

    #[test]
    fn test_walks_nested_config_and_dedupes() {
        let config = json!({
            "subject": "{{contact.missing}}",
            "body": ["{{contact.email}}", { "deep": "{{contact.missing}} {{task.x}}" }],
            "count": 3
        });
        let result = validate(&config, &["contact.email"]);
        assert!(!result.valid);
        assert_eq!(result.missing_fields, vec!["contact.missing", "task.x"]);
    }

    #[test]
    fn test_no_references_is_valid() {
        let result = validate(&json!({ "a": 1, "b": "text" }), &Vec::<String>::new());
        assert_eq!(
            result,
            ValidationResult {
                valid: true,
                missing_fields: vec![]
            }
        );
    }
}
