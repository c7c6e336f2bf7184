//! Text generation capability used by AI actions.
//!
//! Executors talk to a [`TextGenerator`] rather than an LLM backend directly,
//! so the same action code runs against a hosted model, a local one, or a
//! placeholder that reports missing configuration.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use trellis_llm::{CompletionRequest, Message, SharedBackend};

use crate::error::ActionError;

/// Default completion budget when neither the step nor the generator sets one.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A single prompt for the generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    /// Overrides the generator's default model.
    pub model: Option<String>,
    /// Overrides the generator's default token budget.
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ActionError>;

    /// Generate and parse a JSON value.
    async fn generate_structured(&self, request: &GenerationRequest) -> Result<Value, ActionError> {
        let text = self.generate(request).await?;
        parse_structured(&text)
    }
}

/// A generator that can be shared across executors and runs.
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Parse model output as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_structured(text: &str) -> Result<Value, ActionError> {
    let body = strip_code_fence(text);
    serde_json::from_str(body).map_err(|e| {
        ActionError::MalformedResponse(format!("expected JSON output: {}", e))
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM-backed generator
// ─────────────────────────────────────────────────────────────────────────────

/// [`TextGenerator`] over any [`trellis_llm::LlmBackend`].
pub struct LlmGenerator {
    backend: SharedBackend,
    model: String,
    max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(backend: SharedBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Token budget for requests that don't set their own.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ActionError> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let mut completion = CompletionRequest::new(
            model,
            vec![Message::user(request.prompt.clone())],
            request.max_tokens.unwrap_or(self.max_tokens),
        );
        if let Some(ref system) = request.system {
            completion = completion.with_system(system.clone());
        }

        tracing::debug!(
            backend = self.backend.name(),
            model = %completion.model,
            prompt_chars = request.prompt.len(),
            "Generating text"
        );

        let response = self.backend.complete(completion).await?;
        if response.is_empty() {
            return Err(ActionError::MalformedResponse(
                "model returned an empty response".to_string(),
            ));
        }

        tracing::debug!(
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "Generation complete"
        );

        Ok(response.text.trim().to_string())
    }
}

/// Stands in for a generator when no LLM backend could be configured.
///
/// Every call faults with [`ActionError::NotConfigured`] carrying the reason,
/// so steps whose input is absent still skip normally.
pub struct UnconfiguredGenerator {
    reason: String,
}

impl UnconfiguredGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ActionError> {
        Err(ActionError::NotConfigured(self.reason.clone()))
    }
}
