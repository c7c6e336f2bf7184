//! Configuration types for `trellis.toml`.
//!
//! ```toml
//! [llm]
//! backend = "openai"
//! model = "gpt-4o-mini"
//! retry_max = 3
//!
//! [template]
//! max_depth = 10
//!
//! [logging]
//! json_file = true
//! ```

use serde::{Deserialize, Serialize};

/// Default template re-expansion bound.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Upper limit accepted for `template.max_depth`.
pub const MAX_ALLOWED_DEPTH: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Root Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    /// LLM backend used by AI actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
    /// Template engine settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateConfig>,
    /// Logging settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl TrellisConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// `[llm]` merges field by field so a project file can override just the
    /// model while inheriting the user's backend and key.
    pub fn merge(&mut self, other: TrellisConfig) {
        match (&mut self.llm, other.llm) {
            (Some(base), Some(top)) => base.merge(top),
            (slot @ None, Some(top)) => *slot = Some(top),
            (_, None) => {}
        }

        if other.template.is_some() {
            self.template = other.template;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective template re-expansion bound.
    pub fn template_max_depth(&self) -> usize {
        self.template
            .as_ref()
            .map_or(DEFAULT_MAX_DEPTH, |t| t.max_depth)
    }

    /// Whether the JSON log file layer is enabled.
    pub fn json_file_logging(&self) -> bool {
        self.logging.as_ref().is_none_or(|l| l.json_file)
    }

    fn check(&self) -> crate::Result<()> {
        if let Some(ref template) = self.template
            && template.max_depth > MAX_ALLOWED_DEPTH
        {
            return Err(crate::ConfigError::InvalidValue {
                field: "template.max_depth".to_string(),
                message: format!(
                    "{} exceeds the limit of {}",
                    template.max_depth, MAX_ALLOWED_DEPTH
                ),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// LLM backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    /// Model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Custom API base URL (for proxies, custom endpoints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key (prefer an env var; warns if set here).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Maximum retry attempts for transient failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_max: Option<u32>,
    /// Initial backoff between retries in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_ms: Option<u64>,
    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Default token budget for AI actions that don't set their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    /// Returns true if an API key is stored directly in the config file.
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Overlay set fields from `other`.
    pub fn merge(&mut self, other: LlmConfig) {
        fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overlay(&mut self.backend, other.backend);
        overlay(&mut self.model, other.model);
        overlay(&mut self.base_url, other.base_url);
        overlay(&mut self.api_key, other.api_key);
        overlay(&mut self.retry_max, other.retry_max);
        overlay(&mut self.retry_backoff_ms, other.retry_backoff_ms);
        overlay(&mut self.timeout_secs, other.timeout_secs);
        overlay(&mut self.max_tokens, other.max_tokens);
    }
}

/// Supported LLM backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Anthropic,
    Openai,
    Groq,
    Ollama,
    /// Any OpenAI-compatible endpoint; requires `base_url`.
    Custom,
}

impl Backend {
    /// Environment variable name for this backend's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Backend::Anthropic => "ANTHROPIC_API_KEY",
            Backend::Openai => "OPENAI_API_KEY",
            Backend::Groq => "GROQ_API_KEY",
            Backend::Ollama => "OLLAMA_API_KEY",
            Backend::Custom => "LLM_API_KEY",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Anthropic => "Anthropic",
            Backend::Openai => "OpenAI",
            Backend::Groq => "Groq",
            Backend::Ollama => "Ollama",
            Backend::Custom => "Custom",
        }
    }

    /// Local and custom endpoints may run without a key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Backend::Anthropic | Backend::Openai | Backend::Groq)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Template / Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Template engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Maximum number of re-expansion passes after the first.
    pub max_depth: usize,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily-rolling JSON log under the config dir.
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { json_file: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[llm]
backend = "anthropic"
model = "claude-sonnet"
retry_max = 5
max_tokens = 2048

[template]
max_depth = 4

[logging]
json_file = false
"#;

    #[test]
    fn test_parse_full_config() {
        let config = TrellisConfig::from_toml(FULL).unwrap();
        let llm = config.llm.as_ref().unwrap();
        assert_eq!(llm.backend, Some(Backend::Anthropic));
        assert_eq!(llm.model.as_deref(), Some("claude-sonnet"));
        assert_eq!(llm.retry_max, Some(5));
        assert_eq!(llm.max_tokens, Some(2048));
        assert_eq!(config.template_max_depth(), 4);
        assert!(!config.json_file_logging());
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = TrellisConfig::from_toml("").unwrap();
        assert!(config.llm.is_none());
        assert_eq!(config.template_max_depth(), DEFAULT_MAX_DEPTH);
        assert!(config.json_file_logging());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = TrellisConfig::from_toml("[llm]\nbackend = \"mystery\"\n").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Parse(_)));
    }

    #[test]
    fn test_max_depth_limit() {
        let err = TrellisConfig::from_toml("[template]\nmax_depth = 1000\n").unwrap_err();
        assert!(err.to_string().contains("template.max_depth"));
    }

    #[test]
    fn test_merge_llm_field_by_field() {
        let mut base = TrellisConfig::from_toml(
            "[llm]\nbackend = \"groq\"\nmodel = \"base\"\napi_key = \"k\"\n",
        )
        .unwrap();
        let top = TrellisConfig::from_toml("[llm]\nmodel = \"override\"\n").unwrap();
        base.merge(top);

        let llm = base.llm.unwrap();
        assert_eq!(llm.backend, Some(Backend::Groq));
        assert_eq!(llm.model.as_deref(), Some("override"));
        assert_eq!(llm.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = TrellisConfig::from_toml("[template]\nmax_depth = 3\n").unwrap();
        base.merge(TrellisConfig::from_toml("[logging]\njson_file = false\n").unwrap());
        assert_eq!(base.template_max_depth(), 3);
        assert!(!base.json_file_logging());

        base.merge(TrellisConfig::from_toml("[template]\nmax_depth = 7\n").unwrap());
        assert_eq!(base.template_max_depth(), 7);
    }

    #[test]
    fn test_toml_roundtrip_omits_unset() {
        let config = TrellisConfig::from_toml("[llm]\nbackend = \"ollama\"\n").unwrap();
        let out = config.to_toml().unwrap();
        assert!(out.contains("backend = \"ollama\""));
        assert!(!out.contains("api_key"));
        assert_eq!(TrellisConfig::from_toml(&out).unwrap(), config);
    }

    #[test]
    fn test_backend_key_requirements() {
        assert!(Backend::Openai.requires_api_key());
        assert!(!Backend::Ollama.requires_api_key());
        assert_eq!(Backend::Groq.env_var(), "GROQ_API_KEY");
        assert_eq!(Backend::Openai.to_string(), "OpenAI");
    }
}
