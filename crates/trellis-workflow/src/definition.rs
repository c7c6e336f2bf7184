//! Declarative workflow definition parser.
//!
//! Parses TOML workflow files into [`WorkflowDefinition`]s and validates them
//! before they are saved or run.
//!
//! # Example TOML
//!
//! ```toml
//! [workflow]
//! name = "triage_due_tasks"
//! description = "Classify and summarize tasks as they come due"
//! trigger = "task_due"
//!
//! [[workflow.steps]]
//! id = "classify"
//! action = { type = "ai_categorize", field_to_analyze = "task.notes", categories = ["Urgent", "Normal"] }
//!
//! [[workflow.steps]]
//! id = "digest"
//! on_error = "continue"
//! action = { type = "ai_summarize", field_to_analyze = "task.notes", max_length = 40 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_template::{TriggerEvent, ValidationResult, available_fields, extract_from_value};

use crate::action::output_field_problem;
use crate::actions::{CategorizeConfig, GenerateConfig, SummarizeConfig};
use crate::error::{ActionError, WorkflowError};

/// Top-level wrapper matching the TOML structure `[workflow]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowFile {
    pub workflow: WorkflowDefinition,
}

impl WorkflowFile {
    /// Parse a workflow definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, WorkflowError> {
        toml::from_str(toml_str)
            .map_err(|e| WorkflowError::InvalidWorkflow(format!("TOML parse error: {}", e)))
    }

    /// Load a workflow definition from a file path.
    pub fn from_file(path: &Path) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::InvalidWorkflow(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }
}

/// A complete declarative workflow definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowDefinition {
    /// Unique workflow name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Event that starts a run; determines which entity fields are available.
    pub trigger: TriggerEvent,

    /// Steps, executed in declared order.
    pub steps: Vec<StepDefinition>,
}

/// A single step within a workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepDefinition {
    /// Unique step identifier; outputs land at `steps.<id>.output`.
    pub id: String,

    /// What the step does.
    pub action: ActionConfig,

    /// What the runner does when this step faults.
    #[serde(default)]
    pub on_error: OnError,
}

/// Fault policy for a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Stop the run and return the fault.
    #[default]
    Abort,
    /// Record the fault and move on to the next step.
    Continue,
}

/// Typed step action, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    AiGenerate(GenerateConfig),
    AiCategorize(CategorizeConfig),
    AiSummarize(SummarizeConfig),
}

impl ActionConfig {
    /// The `type` discriminant, used to look up an executor.
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionConfig::AiGenerate(_) => crate::actions::generate::ACTION_TYPE,
            ActionConfig::AiCategorize(_) => crate::actions::categorize::ACTION_TYPE,
            ActionConfig::AiSummarize(_) => crate::actions::summarize::ACTION_TYPE,
        }
    }

    /// The not-yet-interpolated config value handed to an executor.
    pub fn to_raw(&self) -> Result<Value, ActionError> {
        let raw = match self {
            ActionConfig::AiGenerate(c) => serde_json::to_value(c),
            ActionConfig::AiCategorize(c) => serde_json::to_value(c),
            ActionConfig::AiSummarize(c) => serde_json::to_value(c),
        };
        raw.map_err(|e| ActionError::InvalidConfig(e.to_string()))
    }

    /// Context paths the action reads directly (not through templates).
    pub fn input_paths(&self) -> Vec<String> {
        match self {
            ActionConfig::AiGenerate(c) => c.source_field.iter().cloned().collect(),
            ActionConfig::AiCategorize(c) => vec![c.field_to_analyze.clone()],
            ActionConfig::AiSummarize(c) => vec![c.field_to_analyze.clone()],
        }
    }

    fn output_field(&self) -> &str {
        match self {
            ActionConfig::AiGenerate(c) => &c.output_field,
            ActionConfig::AiCategorize(c) => &c.output_field,
            ActionConfig::AiSummarize(c) => &c.output_field,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Template check outcome for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepValidation {
    pub step_id: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl WorkflowDefinition {
    /// Validate the workflow structure.
    ///
    /// Checks:
    /// - name is non-empty
    /// - at least one step
    /// - step IDs are non-empty, unique, and usable as a path segment
    /// - per-action required fields are non-empty
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidWorkflow(
                "Workflow name cannot be empty".into(),
            ));
        }

        if self.steps.is_empty() {
            return Err(WorkflowError::InvalidWorkflow(
                "Workflow must have at least one step".into(),
            ));
        }

        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(WorkflowError::InvalidWorkflow(
                    "Step ID cannot be empty".into(),
                ));
            }
            if step.id.contains(['.', '[', ']', '{', '}']) {
                return Err(WorkflowError::InvalidWorkflow(format!(
                    "Step ID '{}' cannot contain '.', brackets, or braces",
                    step.id
                )));
            }
            if !seen_ids.insert(step.id.as_str()) {
                return Err(WorkflowError::InvalidWorkflow(format!(
                    "Duplicate step ID: {}",
                    step.id
                )));
            }
        }

        for step in &self.steps {
            validate_action(&step.id, &step.action)?;
        }

        Ok(())
    }

    /// Check every step's template references against the fields available
    /// for this workflow's trigger.
    ///
    /// Returns one entry per step; this never fails.
    pub fn check_templates(&self) -> Vec<StepValidation> {
        let available = available_fields(self.trigger.entity_type());

        self.steps
            .iter()
            .map(|step| {
                let mut paths = step
                    .action
                    .to_raw()
                    .map(|raw| extract_from_value(&raw))
                    .unwrap_or_default();
                paths.extend(step.action.input_paths());

                StepValidation {
                    step_id: step.id.clone(),
                    result: trellis_template::validate_paths(paths, &available),
                }
            })
            .collect()
    }

    /// Look up a step by ID.
    pub fn step(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == id)
    }
}

fn validate_action(step_id: &str, action: &ActionConfig) -> Result<(), WorkflowError> {
    let invalid = |msg: &str| {
        Err(WorkflowError::InvalidWorkflow(format!(
            "Step '{}' ({}): {}",
            step_id,
            action.action_type(),
            msg
        )))
    };

    if let Some(problem) = output_field_problem(action.output_field()) {
        return invalid(&problem);
    }

    match action {
        ActionConfig::AiGenerate(c) => {
            if c.prompt_template.trim().is_empty() {
                return invalid("prompt_template cannot be empty");
            }
        }
        ActionConfig::AiCategorize(c) => {
            if c.field_to_analyze.trim().is_empty() {
                return invalid("field_to_analyze cannot be empty");
            }
            if c.categories.is_empty() {
                return invalid("categories cannot be empty");
            }
            if c.categories.iter().any(|cat| cat.trim().is_empty()) {
                return invalid("categories cannot contain blank entries");
            }
        }
        ActionConfig::AiSummarize(c) => {
            if c.field_to_analyze.trim().is_empty() {
                return invalid("field_to_analyze cannot be empty");
            }
            if c.max_length == 0 {
                return invalid("max_length must be at least 1");
            }
        }
    }

    Ok(())
}
