//! The action executor contract.
//!
//! Every executor follows the same sequence per invocation:
//!
//! ```text
//! raw config ──interpolate──▶ resolved config ──▶ required input present?
//!                                                   │ no          │ yes
//!                                                   ▼             ▼
//!                                           skipped result   capability call ──▶ shaped output
//!                                                                 │ error
//!                                                                 ▼
//!                                                           Err(ActionError)
//! ```
//!
//! Skips are successful-but-empty outcomes; faults are errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trellis_template::value_to_string;

use crate::context::WorkflowContext;
use crate::error::ActionError;

/// The outcome of one action invocation.
///
/// `output` always carries `success`. Skipped results also carry
/// `skipped: true` and a human-readable `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub output: Map<String, Value>,
}

impl ActionResult {
    /// A successful result with `value` under `output_field` and a timestamp.
    pub fn success(output_field: &str, value: Value) -> Self {
        let mut output = Map::new();
        output.insert("success".into(), Value::Bool(true));
        output.insert(output_field.to_string(), value);
        output.insert(
            "generated_at".into(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        Self { output }
    }

    /// A skipped result explaining why the action did not run.
    pub fn skipped(reason: impl Into<String>) -> Self {
        let mut output = Map::new();
        output.insert("success".into(), Value::Bool(false));
        output.insert("skipped".into(), Value::Bool(true));
        output.insert("reason".into(), Value::String(reason.into()));
        Self { output }
    }

    /// Add an extra output entry.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.output.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.output.get("success").and_then(Value::as_bool) == Some(true)
    }

    pub fn is_skipped(&self) -> bool {
        self.output.get("skipped").and_then(Value::as_bool) == Some(true)
    }

    /// The skip reason, if this result is a skip.
    pub fn skip_reason(&self) -> Option<&str> {
        if !self.is_skipped() {
            return None;
        }
        self.output.get("reason").and_then(Value::as_str)
    }

    /// Look up an output entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.output.get(key)
    }
}

/// Executes one kind of workflow action.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// The `type` discriminant this executor handles, e.g. `"ai_generate"`.
    fn action_type(&self) -> &'static str;

    /// Run with an already-interpolated config.
    async fn run(&self, config: Value, context: &WorkflowContext)
    -> Result<ActionResult, ActionError>;

    /// Interpolate `raw` against `context`, then [`run`](Self::run).
    async fn execute(
        &self,
        raw: &Value,
        context: &WorkflowContext,
    ) -> Result<ActionResult, ActionError> {
        let resolved = context.interpolate_value(raw);
        self.run(resolved, context).await
    }
}

/// Deserialize a resolved config into an executor's typed config.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    action_type: &str,
    config: Value,
) -> Result<T, ActionError> {
    serde_json::from_value(config)
        .map_err(|e| ActionError::InvalidConfig(format!("{}: {}", action_type, e)))
}

/// Keys an executor writes into `ActionResult::output` itself.
///
/// An `output_field` may not use any of them.
pub const RESERVED_OUTPUT_KEYS: &[&str] = &[
    "success",
    "skipped",
    "reason",
    "generated_at",
    "categories",
    "source_field",
];

/// Describe what is wrong with `field` as an output key, if anything.
pub(crate) fn output_field_problem(field: &str) -> Option<String> {
    if field.trim().is_empty() {
        return Some("output_field cannot be empty".to_string());
    }
    if RESERVED_OUTPUT_KEYS.contains(&field.trim()) {
        return Some(format!("output_field '{}' is a reserved result key", field));
    }
    None
}

/// Reject a blank or reserved `output_field`.
pub(crate) fn require_output_field(field: &str) -> Result<(), ActionError> {
    match output_field_problem(field) {
        Some(problem) => Err(ActionError::InvalidConfig(problem)),
        None => Ok(()),
    }
}

/// Read the input text at `path`.
///
/// Missing, null, and blank-string values are all absent. Non-string values
/// are rendered the same way templates render them.
pub fn input_text(context: &WorkflowContext, path: &str) -> Option<String> {
    match context.get(path)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(value_to_string(other)),
    }
}

/// Standard skip reason for absent input.
pub(crate) fn missing_input_reason(path: &str) -> String {
    format!("Field '{}' is empty or missing", path)
}
