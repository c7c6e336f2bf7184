//! `{{path}}` template substitution against a workflow context.
//!
//! # Substitution rules
//!
//! - missing or `null` values render as an empty string
//! - objects and arrays render as compact JSON
//! - scalars render with their natural string form
//!
//! A value pulled from the context may itself contain `{{...}}` tokens
//! (user-entered fields are often templates). After each full pass the engine
//! re-expands the result, up to [`MAX_DEPTH`] extra passes. Past that bound,
//! or once the result exceeds [`MAX_RENDERED_LEN`] bytes, the partially
//! resolved string is returned as-is.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::path;

/// Maximum number of re-expansion passes after the first one.
pub const MAX_DEPTH: usize = 10;

/// Rendered length in bytes past which re-expansion stops.
pub const MAX_RENDERED_LEN: usize = 1024 * 1024;

/// Matches one `{{ ... }}` token whose inner text has no braces.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("token pattern is valid"));

/// Iterate the trimmed inner paths of every token in `s`, in order.
pub(crate) fn token_paths(s: &str) -> impl Iterator<Item = &str> {
    TOKEN
        .captures_iter(s)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Returns true if `s` contains at least one `{{...}}` token.
pub fn has_tokens(s: &str) -> bool {
    TOKEN.is_match(s)
}

/// Resolves `{{path}}` templates against a JSON context.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEngine {
    max_depth: usize,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl TemplateEngine {
    /// Create an engine with the default depth bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom re-expansion bound.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// The configured re-expansion bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Render `template` against `context`.
    ///
    /// Never fails: unresolvable tokens become empty strings, and cyclic
    /// context data stops at the depth bound.
    pub fn render(&self, template: &str, context: &Value) -> String {
        let mut current = substitute(template, context);
        if !has_tokens(&current) || current == template {
            return current;
        }

        for _ in 0..self.max_depth {
            if current.len() > MAX_RENDERED_LEN {
                tracing::warn!(
                    len = current.len(),
                    limit = MAX_RENDERED_LEN,
                    "Template re-expansion hit the length bound; returning partial result"
                );
                return current;
            }
            let next = substitute(&current, context);
            // A fixed point cannot change on further passes.
            if !has_tokens(&next) || next == current {
                return next;
            }
            current = next;
        }

        tracing::warn!(
            max_depth = self.max_depth,
            "Template re-expansion hit the depth bound; returning partial result"
        );
        current
    }
}

/// One substitution pass over every token in `s`.
fn substitute(s: &str, context: &Value) -> String {
    TOKEN
        .replace_all(s, |caps: &Captures<'_>| {
            let inner = caps.get(1).map_or("", |m| m.as_str().trim());
            path::get(context, inner)
                .map(value_to_string)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Convert a resolved value to its template representation.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Render a template with the default engine.
pub fn interpolate(template: &str, context: &Value) -> String {
    TemplateEngine::default().render(template, context)
}
