//! Error types for action execution and workflow runs.

use thiserror::Error;
use trellis_llm::LlmError;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// A fault raised by an action executor.
///
/// Absent input is not a fault; executors report it as a skipped
/// [`ActionResult`](crate::ActionResult).
#[derive(Debug, Error)]
pub enum ActionError {
    /// The capability call failed (network, auth, rate limit, ...).
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The capability answered with something the action cannot use.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The resolved step configuration has the wrong shape.
    #[error("Invalid action config: {0}")]
    InvalidConfig(String),

    /// A capability the action needs is not available.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// No executor is registered under this action type.
    #[error("Unknown action type: {0}")]
    UnknownAction(String),
}

/// Errors that can occur while loading or running a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Invalid workflow definition.
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    /// A step faulted and its `on_error` policy is `abort`.
    #[error("Step '{step_id}' failed: {source}")]
    StepFailed {
        step_id: String,
        #[source]
        source: ActionError,
    },
}
