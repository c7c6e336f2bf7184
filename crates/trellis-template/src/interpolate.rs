//! Template resolution over whole JSON value trees.
//!
//! Used to resolve a step's raw action configuration before it reaches the
//! executor: every string leaf is rendered, containers are rebuilt, other
//! scalars pass through unchanged. The input is never mutated.

use serde_json::{Map, Value};

use crate::engine::TemplateEngine;

impl TemplateEngine {
    /// Resolve all `{{...}}` templates in a JSON value tree.
    pub fn render_value(&self, value: &Value, context: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.render(s, context)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.render_value(item, context))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, item) in map {
                    resolved.insert(key.clone(), self.render_value(item, context));
                }
                Value::Object(resolved)
            }
            other => other.clone(),
        }
    }
}

/// Resolve a JSON value tree with the default engine.
pub fn interpolate_object(value: &Value, context: &Value) -> Value {
    TemplateEngine::default().render_value(value, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_object_resolution() {
        let config = json!({
            "subject": "Re {{contact.last_name}}",
            "meta": { "tags": ["{{task.status}}"] }
        });
        let ctx = json!({
            "contact": { "last_name": "Lee" },
            "task": { "status": "open" }
        });

        let resolved = interpolate_object(&config, &ctx);
        assert_eq!(
            resolved,
            json!({ "subject": "Re Lee", "meta": { "tags": ["open"] } })
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let config = json!({
            "prompt": "Summarize {{task.notes}}",
            "list": ["{{a}}", 1, null, { "deep": "{{b}}" }]
        });
        let snapshot = config.clone();
        let ctx = json!({ "task": { "notes": "n" }, "a": "A", "b": "B" });

        let resolved = interpolate_object(&config, &ctx);
        assert_eq!(config, snapshot);
        assert_ne!(resolved, snapshot);
    }

    #[test]
    fn test_non_string_scalars_pass_through() {
        let ctx = json!({});
        assert_eq!(interpolate_object(&json!(42), &ctx), json!(42));
        assert_eq!(interpolate_object(&json!(true), &ctx), json!(true));
        assert_eq!(interpolate_object(&Value::Null, &ctx), Value::Null);
        assert_eq!(
            interpolate_object(&json!({ "structured": false, "max": 3 }), &ctx),
            json!({ "structured": false, "max": 3 })
        );
    }

    #[test]
    fn test_templated_values_stay_strings() {
        let ctx = json!({ "task": { "priority": 3 } });
        let resolved = interpolate_object(&json!({ "p": "{{task.priority}}" }), &ctx);
        assert_eq!(resolved, json!({ "p": "3" }));
    }

    #[test]
    fn test_keys_are_not_interpolated() {
        let ctx = json!({ "k": "v" });
        let resolved = interpolate_object(&json!({ "{{k}}": "{{k}}" }), &ctx);
        assert_eq!(resolved, json!({ "{{k}}": "v" }));
    }
}
