//! API key resolution.
//!
//! Resolution order:
//! 1. Environment variable (backend-specific)
//! 2. Config file (with warning)

use crate::Backend;

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve an API key for a backend from the process environment, falling
/// back to the config file value.
pub fn resolve_api_key(backend: &Backend, config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve_api_key_with(backend, config_value, |var| std::env::var(var).ok())
}

/// Resolve an API key with a custom environment lookup.
pub fn resolve_api_key_with<F>(
    backend: &Backend,
    config_value: Option<&str>,
    lookup: F,
) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    let env_var = backend.env_var();
    if let Some(value) = lookup(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(var: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == var).then(|| value.to_string())
    }

    #[test]
    fn test_env_var_wins_over_config() {
        let secret = resolve_api_key_with(
            &Backend::Openai,
            Some("from-file"),
            env_with("OPENAI_API_KEY", "from-env"),
        )
        .unwrap();
        assert_eq!(secret.value, "from-env");
        assert_eq!(secret.source, SecretSource::EnvVar("OPENAI_API_KEY".into()));
    }

    #[test]
    fn test_falls_back_to_config_file() {
        let secret =
            resolve_api_key_with(&Backend::Groq, Some("from-file"), |_| None).unwrap();
        assert_eq!(secret.value, "from-file");
        assert_eq!(secret.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_empty_env_var_ignored() {
        let secret = resolve_api_key_with(
            &Backend::Anthropic,
            Some("file"),
            env_with("ANTHROPIC_API_KEY", ""),
        )
        .unwrap();
        assert_eq!(secret.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_other_backends_env_var_not_used() {
        let secret = resolve_api_key_with(
            &Backend::Groq,
            None,
            env_with("OPENAI_API_KEY", "wrong"),
        );
        assert!(secret.is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            SecretSource::EnvVar("GROQ_API_KEY".into()).to_string(),
            "env var GROQ_API_KEY"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file (plaintext)");
    }
}
