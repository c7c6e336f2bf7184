//! Configuration for Trellis.
//!
//! Provides TOML-based configuration with:
//! - An `[llm]` backend section used by AI actions
//! - Template and logging settings
//! - Config file layering (user config + project-local overrides)
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod resolver;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options, log_dir,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use resolver::{ResolvedLlm, resolve_llm, resolve_llm_with};
pub use secrets::{ResolvedSecret, SecretSource};
pub use types::*;
