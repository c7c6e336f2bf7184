//! Builds the text generator for AI actions from resolved configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use trellis_config::{Backend, ResolvedLlm, TrellisConfig};
use trellis_llm::{AnthropicBackend, AnthropicConfig, OpenAiBackend, OpenAiConfig, SharedBackend};
use trellis_workflow::{LlmGenerator, SharedGenerator, UnconfiguredGenerator};

/// Construct an LLM backend for a resolved `[llm]` section.
pub fn build_backend(resolved: &ResolvedLlm) -> Result<SharedBackend> {
    let api_key = resolved.api_key.clone().unwrap_or_default();
    let timeout = Duration::from_secs(resolved.timeout_secs);
    let backoff = Duration::from_millis(resolved.retry_backoff_ms);

    let backend: SharedBackend = match resolved.backend {
        Backend::Anthropic => {
            let mut config = AnthropicConfig::new(api_key)
                .with_timeout(timeout)
                .with_max_retries(resolved.retry_max)
                .with_retry_backoff(backoff);
            if let Some(ref url) = resolved.base_url {
                config = config.with_base_url(url);
            }
            Arc::new(AnthropicBackend::new(config)?)
        }
        Backend::Openai | Backend::Groq | Backend::Ollama | Backend::Custom => {
            let mut config = match resolved.backend {
                Backend::Openai => OpenAiConfig::openai(api_key),
                Backend::Groq => OpenAiConfig::groq(api_key),
                Backend::Ollama => OpenAiConfig::ollama(),
                _ => OpenAiConfig::ollama().with_name("custom"),
            };
            if let Some(ref key) = resolved.api_key {
                config.api_key = Some(key.clone());
            }
            if let Some(ref url) = resolved.base_url {
                config = config.with_base_url(url);
            }
            Arc::new(OpenAiBackend::new(
                config
                    .with_timeout(timeout)
                    .with_max_retries(resolved.retry_max)
                    .with_retry_backoff(backoff),
            )?)
        }
    };

    Ok(backend)
}

/// The generator AI actions should use.
///
/// When the `[llm]` section cannot be resolved, AI steps with input present
/// fault with the resolution error instead of the whole command failing.
pub fn build_generator(config: &TrellisConfig) -> Result<SharedGenerator> {
    match trellis_config::resolve_llm(config) {
        Ok(resolved) => {
            if let Some(ref source) = resolved.api_key_source {
                tracing::debug!(backend = %resolved.backend, %source, "Resolved API key");
            }
            let backend = build_backend(&resolved)?;
            tracing::info!(backend = backend.name(), model = %resolved.model, "LLM backend ready");
            Ok(Arc::new(
                LlmGenerator::new(backend, resolved.model).with_max_tokens(resolved.max_tokens),
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM backend not configured; AI steps will fault");
            Ok(Arc::new(UnconfiguredGenerator::new(e.to_string())))
        }
    }
}
