//! `ai_summarize`: condense a context field to a bounded number of words.

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
pub const ACTION_TYPE: &str = "ai_summarize";

fn default_output_field() -> String {
    "summary".to_string()
}

fn default_max_length() -> u32 {
    100
}

/// Configuration for `ai_summarize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// Context path of the text to summarize.
    pub field_to_analyze: String,
    #[serde(default = "default_output_field")]
    pub output_field: String,
    /// Upper bound on summary length, in words.
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    /// Free-form style hint, e.g. "bullet points".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Executor for `ai_summarize`.
pub struct SummarizeAction {
    generator: SharedGenerator,
}

impl SummarizeAction {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ActionExecutor for SummarizeAction {
    fn action_type(&self) -> &'static str {
        ACTION_TYPE
    }

    async fn run(
        &self,
        config: Value,
        context: &WorkflowContext,
    ) -> Result<ActionResult, ActionError> {
        let config: SummarizeConfig = parse_config(ACTION_TYPE, config)?;
        require_output_field(&config.output_field)?;
        if config.max_length == 0 {
            return Err(ActionError::InvalidConfig(
                "ai_summarize: max_length must be at least 1".to_string(),
            ));
        }

        let Some(text) = input_text(context, &config.field_to_analyze) else {
            return Ok(ActionResult::skipped(missing_input_reason(
                &config.field_to_analyze,
            )));
        };

        let mut prompt = format!(
            "Summarize the following text in at most {} words.",
            config.max_length
        );
        if let Some(ref style) = config.style
            && !style.trim().is_empty()
        {
            prompt.push_str(&format!(" Style: {}.", style.trim()));
        }
        prompt.push_str("\n\nText:\n");
        prompt.push_str(&text);

        let request = GenerationRequest::new(prompt)
            .with_model(config.model.clone())
            .with_max_tokens(config.max_tokens);
        let summary = self.generator.generate(&request).await?;

        Ok(
            ActionResult::success(&config.output_field, Value::String(summary))
                .with("source_field", config.field_to_analyze.clone()),
        )
    }
}
