//! `ai_categorize`: assign one of a fixed set of categories to a context field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{
    ActionExecutor, ActionResult, input_text, missing_input_reason, parse_config,
    require_output_field,
};
use crate::capability::{GenerationRequest, SharedGenerator};
use crate::context::WorkflowContext;
use crate::error::ActionError;

/// Action type discriminant.
pub const ACTION_TYPE: &str = "ai_categorize";

const SYSTEM_PROMPT: &str =
    "You are a precise classifier. Answer with exactly one category name and nothing else.";

fn default_output_field() -> String {
    "category".to_string()
}

/// Configuration for `ai_categorize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeConfig {
    /// Context path of the text to classify, e.g. `task.notes`.
    pub field_to_analyze: String,
    pub categories: Vec<String>,
    #[serde(default = "default_output_field")]
    pub output_field: String,
    /// Extra guidance appended to the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Executor for `ai_categorize`.
pub struct CategorizeAction {
    generator: SharedGenerator,
}

impl CategorizeAction {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ActionExecutor for CategorizeAction {
    fn action_type(&self) -> &'static str {
        ACTION_TYPE
    }

    async fn run(
        &self,
        config: Value,
        context: &WorkflowContext,
    ) -> Result<ActionResult, ActionError> {
        let config: CategorizeConfig = parse_config(ACTION_TYPE, config)?;
        require_output_field(&config.output_field)?;
        if config.categories.is_empty() {
            return Err(ActionError::InvalidConfig(
                "ai_categorize: categories cannot be empty".to_string(),
            ));
        }
        if config.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ActionError::InvalidConfig(
                "ai_categorize: categories cannot contain blank entries".to_string(),
            ));
        }

        let Some(text) = input_text(context, &config.field_to_analyze) else {
            return Ok(ActionResult::skipped(missing_input_reason(
                &config.field_to_analyze,
            )));
        };

        let request = GenerationRequest::new(build_prompt(&config, &text))
            .with_system(SYSTEM_PROMPT)
            .with_model(config.model.clone())
            .with_max_tokens(config.max_tokens);
        let response = self.generator.generate(&request).await?;

        let category = match_category(&response, &config.categories).ok_or_else(|| {
            ActionError::MalformedResponse(format!(
                "response '{}' matches none of the categories [{}]",
                response.trim(),
                config.categories.join(", ")
            ))
        })?;

        tracing::debug!(field = %config.field_to_analyze, category, "Categorized");

        Ok(
            ActionResult::success(&config.output_field, Value::String(category.to_string()))
                .with("categories", config.categories.clone()),
        )
    }
}

fn build_prompt(config: &CategorizeConfig, text: &str) -> String {
    let mut prompt = format!(
        "Categorize the following text into exactly one of these categories: {}.\n",
        config.categories.join(", ")
    );
    if let Some(ref instructions) = config.instructions
        && !instructions.trim().is_empty()
    {
        prompt.push_str(instructions.trim());
        prompt.push('\n');
    }
    prompt.push_str("Respond with only the category name.\n\nText:\n");
    prompt.push_str(text);
    prompt
}

/// Map a model response onto one of `categories`.
///
/// Case-insensitive exact match first; otherwise the longest category the
/// response contains. Blank categories and blank answers never match.
pub fn match_category<'a>(response: &str, categories: &'a [String]) -> Option<&'a str> {
    let answer = response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '*')
        .trim()
        .to_lowercase();
    if answer.is_empty() {
        return None;
    }

    let candidates = categories.iter().filter(|c| !c.trim().is_empty());
    if let Some(exact) = candidates
        .clone()
        .find(|c| c.trim().to_lowercase() == answer)
    {
        return Some(exact.as_str());
    }

    candidates
        .filter(|c| answer.contains(&c.trim().to_lowercase()))
        .max_by_key(|c| c.trim().len())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trellis_llm::{MockBackend, MockResponse};

    use crate::capability::LlmGenerator;

    fn action(backend: MockBackend) -> (Arc<MockBackend>, CategorizeAction) {
        let backend = Arc::new(backend);
        let generator = Arc::new(LlmGenerator::new(backend.clone(), "m"));
        (backend, CategorizeAction::new(generator))
    }

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_category_exact_and_case() {
        let cats = categories(&["Urgent", "Normal"]);
        assert_eq!(match_category("urgent", &cats), Some("Urgent"));
        assert_eq!(match_category(" \"Normal\". ", &cats), Some("Normal"));
    }

    #[test]
    fn test_match_category_containment_prefers_longest() {
        let cats = categories(&["Normal", "Abnormal"]);
        assert_eq!(match_category("This looks abnormal to me", &cats), Some("Abnormal"));
        assert_eq!(match_category("Category: normal", &cats), Some("Normal"));
        assert_eq!(match_category("unclear", &cats), None);
    }

    #[test]
    fn test_match_category_ignores_blank() {
        let cats = categories(&["Urgent", " "]);
        assert_eq!(match_category(".", &cats), None);
        assert_eq!(match_category("**", &cats), None);
        assert_eq!(match_category("urgent", &cats), Some("Urgent"));
    }

    #[tokio::test]
    async fn test_categorize_custom_output_field_keeps_reserved_keys() {
        let (_, action) = action(MockBackend::with_text("Normal"));
        let raw = json!({
            "field_to_analyze": "task.notes",
            "categories": ["Urgent", "Normal"],
            "output_field": "priority"
        });
        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "whenever" } }));

        let result = action.execute(&raw, &ctx).await.unwrap();
        assert!(result.is_success());
        assert!(!result.is_skipped());
        assert_eq!(result.get("priority"), Some(&json!("Normal")));
        assert_eq!(result.get("success"), Some(&json!(true)));
        assert_eq!(result.get("categories"), Some(&json!(["Urgent", "Normal"])));
        assert!(result.get("generated_at").unwrap().is_string());
        assert!(result.get("category").is_none());
    }

    #[tokio::test]
    async fn test_categorize_reserved_output_field_rejected() {
        let (backend, action) = action(MockBackend::with_text("Urgent"));
        let raw = json!({
            "field_to_analyze": "task.notes",
            "categories": ["Urgent", "Normal"],
            "output_field": "success"
        });
        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "n" } }));

        let err = action.execute(&raw, &ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig(ref m) if m.contains("reserved")));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_categorize_blank_category_rejected() {
        let (_, action) = action(MockBackend::with_text("."));
        let raw = json!({ "field_to_analyze": "task.notes", "categories": ["Urgent", " "] });
        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "n" } }));

        let err = action.execute(&raw, &ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig(ref m) if m.contains("blank")));
    }

    #[tokio::test]
    async fn test_categorize_skips_without_task() {
        let (backend, action) = action(MockBackend::with_text("Urgent"));
        let raw = json!({ "field_to_analyze": "task.notes", "categories": ["Urgent", "Normal"] });
        let ctx = WorkflowContext::from_value(json!({ "contact": { "first_name": "Ana" } }));

        let result = action.execute(&raw, &ctx).await.unwrap();
        assert_eq!(result.get("success"), Some(&json!(false)));
        assert_eq!(result.get("skipped"), Some(&json!(true)));
        assert!(result.skip_reason().unwrap().contains("task.notes"));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_categorize_success() {
        let (backend, action) = action(MockBackend::with_text("urgent."));
        let raw = json!({
            "field_to_analyze": "task.notes",
            "categories": ["Urgent", "Normal"],
            "instructions": "Deadlines within a day are {{policy.urgent_label}}."
        });
        let ctx = WorkflowContext::from_value(json!({
            "task": { "notes": "Client escalation, due tonight" },
            "policy": { "urgent_label": "Urgent" }
        }));

        let result = action.execute(&raw, &ctx).await.unwrap();
        assert_eq!(result.get("category"), Some(&json!("Urgent")));
        assert_eq!(result.get("categories"), Some(&json!(["Urgent", "Normal"])));

        let prompt = &backend.requests()[0].messages[0].content;
        assert!(prompt.contains("Urgent, Normal"));
        assert!(prompt.contains("Deadlines within a day are Urgent."));
        assert!(prompt.ends_with("Client escalation, due tonight"));
    }

    #[tokio::test]
    async fn test_categorize_unmatched_response_is_fault() {
        let (_, action) = action(MockBackend::with_text("Banana"));
        let raw = json!({ "field_to_analyze": "task.notes", "categories": ["Urgent", "Normal"] });
        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "n" } }));

        let err = action.execute(&raw, &ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::MalformedResponse(ref m) if m.contains("Banana")));
    }

    #[tokio::test]
    async fn test_categorize_capability_failure_is_fault_not_skip() {
        let (_, action) = action(MockBackend::new(vec![MockResponse::Error("timeout".into())]));
        let raw = json!({ "field_to_analyze": "task.notes", "categories": ["A"] });
        let ctx = WorkflowContext::from_value(json!({ "task": { "notes": "n" } }));

        let err = action.execute(&raw, &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Backend error: timeout");
    }

    #[tokio::test]
    async fn test_categorize_empty_categories_rejected() {
        let (_, action) = action(MockBackend::with_text("x"));
        let raw = json!({ "field_to_analyze": "task.notes", "categories": [] });
        let err = action
            .execute(&raw, &WorkflowContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig(_)));
    }
}
