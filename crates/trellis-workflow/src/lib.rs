//! Workflow context, AI action executors, and step runner for Trellis.
//!
//! A run threads one [`WorkflowContext`] through the steps of a
//! [`WorkflowDefinition`]. Each step's raw config is interpolated against the
//! context, handed to the matching [`ActionExecutor`], and the resulting
//! [`ActionResult`] is merged back under `steps.<id>.output`.
//!
//! ```text
//! WorkflowDefinition (TOML)
//!        │
//!        ▼
//! WorkflowRunner ──▶ ActionRegistry ──▶ ActionExecutor ──▶ TextGenerator ──▶ LlmBackend
//!        │                                   │
//!        └────── WorkflowContext ◀───────────┘  (with_step_output)
//! ```
//!
//! Absent input yields a skipped result; capability failures are
//! [`ActionError`]s and the step's `on_error` policy decides what happens next.

pub mod action;
pub mod actions;
pub mod capability;
pub mod context;
pub mod definition;
pub mod error;
pub mod registry;
pub mod runner;

pub use action::{ActionExecutor, ActionResult, RESERVED_OUTPUT_KEYS, input_text};
pub use actions::{
    CategorizeAction, CategorizeConfig, GenerateAction, GenerateConfig, SummarizeAction,
    SummarizeConfig,
};
pub use capability::{
    GenerationRequest, LlmGenerator, SharedGenerator, TextGenerator, UnconfiguredGenerator,
    parse_structured,
};
pub use context::WorkflowContext;
pub use definition::{
    ActionConfig, OnError, StepDefinition, StepValidation, WorkflowDefinition, WorkflowFile,
};
pub use error::{ActionError, Result, WorkflowError};
pub use registry::ActionRegistry;
pub use runner::{RunReport, StepReport, StepStatus, WorkflowRunner};
