//! Action type → executor lookup.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::action::{ActionExecutor, ActionResult};
use crate::actions::{CategorizeAction, GenerateAction, SummarizeAction};
use crate::capability::SharedGenerator;
use crate::context::WorkflowContext;
use crate::error::ActionError;

/// Executors keyed by their action type.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the three built-in AI actions sharing `generator`.
    pub fn with_ai_actions(generator: SharedGenerator) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GenerateAction::new(generator.clone())));
        registry.register(Arc::new(CategorizeAction::new(generator.clone())));
        registry.register(Arc::new(SummarizeAction::new(generator)));
        registry
    }

    /// Register an executor, replacing any previous one for the same type.
    pub fn register(&mut self, executor: Arc<dyn ActionExecutor>) {
        self.executors
            .insert(executor.action_type().to_string(), executor);
    }

    pub fn get(&self, action_type: &str) -> Option<&Arc<dyn ActionExecutor>> {
        self.executors.get(action_type)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.executors.contains_key(action_type)
    }

    /// Registered action types, sorted.
    pub fn action_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Interpolate and run `raw` with the executor for `action_type`.
    pub async fn execute(
        &self,
        action_type: &str,
        raw: &Value,
        context: &WorkflowContext,
    ) -> Result<ActionResult, ActionError> {
        let executor = self
            .get(action_type)
            .ok_or_else(|| ActionError::UnknownAction(action_type.to_string()))?;
        executor.execute(raw, context).await
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("action_types", &self.action_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::capability::UnconfiguredGenerator;

    struct Echo;

    #[async_trait]
    impl ActionExecutor for Echo {
        fn action_type(&self) -> &'static str {
            "echo"
        }

        async fn run(
            &self,
            config: Value,
            _context: &WorkflowContext,
        ) -> Result<ActionResult, ActionError> {
            Ok(ActionResult::success("echo", config))
        }
    }

    #[test]
    fn test_with_ai_actions_registers_all() {
        let registry = ActionRegistry::with_ai_actions(Arc::new(UnconfiguredGenerator::new("x")));
        assert_eq!(
            registry.action_types(),
            vec!["ai_categorize", "ai_generate", "ai_summarize"]
        );
    }

    #[tokio::test]
    async fn test_execute_interpolates_before_run() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Echo));
        let ctx = WorkflowContext::from_value(json!({ "contact": { "last_name": "Lee" } }));

        let result = registry
            .execute("echo", &json!({ "subject": "Re {{contact.last_name}}" }), &ctx)
            .await
            .unwrap();
        assert_eq!(result.get("echo"), Some(&json!({ "subject": "Re Lee" })));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let err = ActionRegistry::new()
            .execute("send_sms", &json!({}), &WorkflowContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown action type: send_sms");
    }

    #[tokio::test]
    async fn test_unconfigured_ai_still_skips_absent_input() {
        let registry = ActionRegistry::with_ai_actions(Arc::new(UnconfiguredGenerator::new(
            "no [llm] section",
        )));
        let raw = json!({ "field_to_analyze": "task.notes" });

        let skipped = registry
            .execute("ai_summarize", &raw, &WorkflowContext::new())
            .await
            .unwrap();
        assert!(skipped.is_skipped());

        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "text" } }));
        let err = registry.execute("ai_summarize", &raw, &ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::NotConfigured(_)));
    }
}
