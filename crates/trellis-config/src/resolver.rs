//! LLM config resolution: turns the `[llm]` section into a concrete backend
//! config with defaults filled in and the API key looked up.

use crate::secrets::{self, ResolvedSecret, SecretSource};
use crate::{Backend, ConfigError, Result, TrellisConfig};

/// Default retry attempts for transient failures.
pub const DEFAULT_RETRY_MAX: u32 = 3;

/// Default initial retry backoff in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default token budget for AI actions.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A fully resolved LLM configuration ready to construct a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLlm {
    /// The backend provider.
    pub backend: Backend,
    /// Model identifier.
    pub model: String,
    /// API base URL (if custom).
    pub base_url: Option<String>,
    /// Resolved API key.
    pub api_key: Option<String>,
    /// Where the API key was resolved from.
    pub api_key_source: Option<SecretSource>,
    /// Maximum retry attempts.
    pub retry_max: u32,
    /// Initial retry backoff in milliseconds.
    pub retry_backoff_ms: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Default token budget for AI actions.
    pub max_tokens: u32,
}

/// Resolve the `[llm]` section using the process environment for API keys.
pub fn resolve_llm(config: &TrellisConfig) -> Result<ResolvedLlm> {
    resolve_llm_with(config, |var| std::env::var(var).ok())
}

/// Resolve the `[llm]` section with a custom environment lookup.
///
/// 1. Require `backend` and `model`
/// 2. Require `base_url` for the custom backend
/// 3. Resolve the API key (env var → config file), required for hosted backends
pub fn resolve_llm_with<F>(config: &TrellisConfig, lookup: F) -> Result<ResolvedLlm>
where
    F: Fn(&str) -> Option<String>,
{
    let llm = config.llm.as_ref().ok_or(ConfigError::NoDefaultLlm)?;

    let backend = llm.backend.ok_or_else(|| ConfigError::MissingField {
        field: "backend".to_string(),
        context: "[llm]".to_string(),
    })?;

    let model = llm
        .model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: "model".to_string(),
            context: "[llm]".to_string(),
        })?;

    if backend == Backend::Custom && llm.base_url.is_none() {
        return Err(ConfigError::MissingField {
            field: "base_url".to_string(),
            context: "[llm] with backend = \"custom\"".to_string(),
        });
    }

    let secret = secrets::resolve_api_key_with(&backend, llm.api_key.as_deref(), lookup);
    if secret.is_none() && backend.requires_api_key() {
        return Err(ConfigError::ApiKeyNotFound {
            backend: backend.display_name().to_string(),
            env_var: backend.env_var().to_string(),
        });
    }
    let (api_key, api_key_source) = match secret {
        Some(ResolvedSecret { value, source }) => (Some(value), Some(source)),
        None => (None, None),
    };

    Ok(ResolvedLlm {
        backend,
        model,
        base_url: llm.base_url.clone(),
        api_key,
        api_key_source,
        retry_max: llm.retry_max.unwrap_or(DEFAULT_RETRY_MAX),
        retry_backoff_ms: llm.retry_backoff_ms.unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
        timeout_secs: llm.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        max_tokens: llm.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    })
}
