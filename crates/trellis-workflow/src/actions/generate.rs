//! `ai_generate`: free-form or structured generation from a prompt template.

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
pub const ACTION_TYPE: &str = "ai_generate";

fn default_output_field() -> String {
    "generated_content".to_string()
}

/// Configuration for `ai_generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Prompt, usually with `{{...}}` tokens.
    pub prompt_template: String,
    #[serde(default = "default_output_field")]
    pub output_field: String,
    /// Parse the response as JSON.
    #[serde(default)]
    pub structured: bool,
    /// Skip the step when this context path is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Executor for `ai_generate`.
pub struct GenerateAction {
    generator: SharedGenerator,
}

impl GenerateAction {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ActionExecutor for GenerateAction {
    fn action_type(&self) -> &'static str {
        ACTION_TYPE
    }

    async fn run(
        &self,
        config: Value,
        context: &WorkflowContext,
    ) -> Result<ActionResult, ActionError> {
        let config: GenerateConfig = parse_config(ACTION_TYPE, config)?;
        require_output_field(&config.output_field)?;

        if let Some(ref source) = config.source_field
            && input_text(context, source).is_none()
        {
            return Ok(ActionResult::skipped(missing_input_reason(source)));
        }

        let prompt = config.prompt_template.trim();
        if prompt.is_empty() {
            return Ok(ActionResult::skipped("Prompt resolved to empty text"));
        }

        let mut request = GenerationRequest::new(prompt)
            .with_model(config.model)
            .with_max_tokens(config.max_tokens);
        if let Some(system) = config.system_prompt {
            request = request.with_system(system);
        }

        let value = if config.structured {
            self.generator.generate_structured(&request).await?
        } else {
            Value::String(self.generator.generate(&request).await?)
        };

        Ok(ActionResult::success(&config.output_field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trellis_llm::MockBackend;

    use crate::capability::LlmGenerator;

    fn action(reply: &str) -> (Arc<MockBackend>, GenerateAction) {
        let backend = Arc::new(MockBackend::with_text(reply));
        let generator = Arc::new(LlmGenerator::new(backend.clone(), "m"));
        (backend, GenerateAction::new(generator))
    }

    fn ctx() -> WorkflowContext {
        WorkflowContext::from_value(json!({
            "contact": { "first_name": "Ana", "notes": "" }
        }))
    }

    #[tokio::test]
    async fn test_generate_interpolates_prompt() {
        let (backend, action) = action("Welcome aboard, Ana!");
        let raw = json!({ "prompt_template": "Write a welcome for {{contact.first_name}}" });

        let result = action.execute(&raw, &ctx()).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.get("generated_content"), Some(&json!("Welcome aboard, Ana!")));
        assert_eq!(
            backend.requests()[0].messages[0].content,
            "Write a welcome for Ana"
        );
    }

    #[tokio::test]
    async fn test_generate_structured_output() {
        let (_, action) = action("{\"subject\": \"Hi\", \"body\": \"...\"}");
        let raw = json!({
            "prompt_template": "Draft an email to {{contact.first_name}}",
            "output_field": "email",
            "structured": true
        });

        let result = action.execute(&raw, &ctx()).await.unwrap();
        assert_eq!(result.get("email").unwrap()["subject"], "Hi");
    }

    #[tokio::test]
    async fn test_generate_custom_output_field_keeps_reserved_keys() {
        let (_, action) = action("hello");
        let raw = json!({ "prompt_template": "Greet {{contact.first_name}}", "output_field": "greeting" });

        let result = action.execute(&raw, &ctx()).await.unwrap();
        assert_eq!(result.get("greeting"), Some(&json!("hello")));
        assert_eq!(result.get("success"), Some(&json!(true)));
        assert!(result.get("generated_at").unwrap().is_string());
        assert!(result.get("generated_content").is_none());
    }

    #[tokio::test]
    async fn test_generate_reserved_output_field_rejected() {
        let (backend, action) = action("hello");
        for field in ["generated_at", "success"] {
            let raw = json!({ "prompt_template": "Greet {{contact.first_name}}", "output_field": field });
            let err = action.execute(&raw, &ctx()).await.unwrap_err();
            assert!(matches!(err, ActionError::InvalidConfig(ref m) if m.contains(field)));
        }
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_skips_on_absent_source() {
        let (backend, action) = action("unused");
        let raw = json!({
            "prompt_template": "Summarize {{contact.notes}}",
            "source_field": "contact.notes"
        });

        let result = action.execute(&raw, &ctx()).await.unwrap();
        assert!(result.is_skipped());
        assert!(result.skip_reason().unwrap().contains("contact.notes"));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_skips_on_empty_prompt() {
        let (backend, action) = action("unused");
        let raw = json!({ "prompt_template": "{{contact.missing}}" });

        let result = action.execute(&raw, &ctx()).await.unwrap();
        assert!(result.is_skipped());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_non_string_prompt() {
        let (_, action) = action("unused");
        let err = action
            .execute(&json!({ "prompt_template": 42 }), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig(ref m) if m.starts_with("ai_generate")));
    }

    #[tokio::test]
    async fn test_generate_structured_fault_on_prose() {
        let (_, action) = action("I cannot produce JSON today.");
        let raw = json!({ "prompt_template": "p", "structured": true });
        let err = action.execute(&raw, &ctx()).await.unwrap_err();
        assert!(matches!(err, ActionError::MalformedResponse(_)));
    }
}
