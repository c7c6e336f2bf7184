//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No `[llm]` section anywhere in the layered config.
    #[error("no LLM configured; add an [llm] section to trellis.toml")]
    NoDefaultLlm,

    /// Missing required field.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// API key not found through any resolution method.
    #[error("API key not found for backend '{backend}'. Set {env_var} or api_key in the config file")]
    ApiKeyNotFound { backend: String, env_var: String },

    /// A value is present but out of range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}
