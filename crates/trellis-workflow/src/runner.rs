//! Sequential step runner.
//!
//! For each step in declared order:
//!
//! ```text
//! raw action config ─▶ registry.execute(type, raw, ctx) ─▶ ActionResult
//!                                                             │
//!                          ctx = ctx.with_step_output(id, result)
//! ```
//!
//! Skipped steps still record their output, so later steps see
//! `steps.<id>.output.skipped == true`. Faulted steps record nothing; the
//! step's `on_error` policy decides whether the run continues.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::WorkflowContext;
use crate::definition::{OnError, StepDefinition, WorkflowDefinition};
use crate::error::{ActionError, Result, WorkflowError};
use crate::registry::ActionRegistry;

/// How one step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Skipped { reason: String },
    Failed { error: String },
}

/// Per-step entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step_id: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub workflow: String,
    /// Final context, including every recorded step output.
    pub context: WorkflowContext,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Number of steps that faulted and were continued past.
    pub fn failed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { .. }))
            .count()
    }
}

/// Runs workflow definitions against a registry of executors.
#[derive(Debug, Clone)]
pub struct WorkflowRunner {
    registry: ActionRegistry,
}

impl WorkflowRunner {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Run every step of `definition` in order, threading `context` through.
    ///
    /// Returns [`WorkflowError::StepFailed`] for the first faulting step whose
    /// policy is `abort`.
    pub async fn run(
        &self,
        definition: &WorkflowDefinition,
        context: WorkflowContext,
    ) -> Result<RunReport> {
        definition.validate()?;

        let run_id = Uuid::new_v4();
        let mut context = context;
        let mut steps = Vec::with_capacity(definition.steps.len());

        info!(%run_id, workflow = %definition.name, steps = definition.steps.len(), "Workflow run started");

        for step in &definition.steps {
            match self.run_step(step, &context).await {
                Ok(result) => {
                    let status = match result.skip_reason() {
                        Some(reason) => {
                            info!(%run_id, step = %step.id, reason, "Step skipped");
                            StepStatus::Skipped {
                                reason: reason.to_string(),
                            }
                        }
                        None => {
                            debug!(%run_id, step = %step.id, "Step succeeded");
                            StepStatus::Succeeded
                        }
                    };
                    context = context.with_step_output(&step.id, &result);
                    steps.push(StepReport {
                        step_id: step.id.clone(),
                        status,
                    });
                }
                Err(err) => {
                    warn!(%run_id, step = %step.id, error = %err, on_error = ?step.on_error, "Step failed");
                    match step.on_error {
                        OnError::Abort => {
                            return Err(WorkflowError::StepFailed {
                                step_id: step.id.clone(),
                                source: err,
                            });
                        }
                        OnError::Continue => steps.push(StepReport {
                            step_id: step.id.clone(),
                            status: StepStatus::Failed {
                                error: err.to_string(),
                            },
                        }),
                    }
                }
            }
        }

        info!(%run_id, workflow = %definition.name, "Workflow run finished");

        Ok(RunReport {
            run_id,
            workflow: definition.name.clone(),
            context,
            steps,
        })
    }

    async fn run_step(
        &self,
        step: &StepDefinition,
        context: &WorkflowContext,
    ) -> std::result::Result<crate::ActionResult, ActionError> {
        let raw = step.action.to_raw()?;
        self.registry
            .execute(step.action.action_type(), &raw, context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trellis_llm::{MockBackend, MockResponse};

    use crate::capability::LlmGenerator;
    use crate::definition::WorkflowFile;

    const TRIAGE: &str = r#"
[workflow]
name = "triage"
trigger = "task_due"

[[workflow.steps]]
id = "classify"
action = { type = "ai_categorize", field_to_analyze = "task.notes", categories = ["Urgent", "Normal"] }

[[workflow.steps]]
id = "reply"
action = { type = "ai_generate", prompt_template = "Write a {{steps.classify.output.category}} reply about {{task.title}}", output_field = "draft" }
"#;

    fn runner(responses: Vec<MockResponse>) -> (Arc<MockBackend>, WorkflowRunner) {
        let backend = Arc::new(MockBackend::new(responses));
        let generator = Arc::new(LlmGenerator::new(backend.clone(), "m"));
        (
            backend,
            WorkflowRunner::new(ActionRegistry::with_ai_actions(generator)),
        )
    }

    fn definition(toml: &str) -> WorkflowDefinition {
        WorkflowFile::from_toml(toml).unwrap().workflow
    }

    fn task_context(notes: serde_json::Value) -> WorkflowContext {
        WorkflowContext::from_value(json!({ "task": { "title": "Renewal", "notes": notes } }))
    }

    #[tokio::test]
    async fn test_step_outputs_flow_downstream() {
        let (backend, runner) = runner(vec![
            MockResponse::Text("Urgent".into()),
            MockResponse::Text("On it today.".into()),
        ]);

        let report = runner
            .run(&definition(TRIAGE), task_context(json!("Contract expires tomorrow")))
            .await
            .unwrap();

        assert_eq!(report.workflow, "triage");
        assert_eq!(report.steps.len(), 2);
        assert!(report.steps.iter().all(|s| s.status == StepStatus::Succeeded));
        assert_eq!(
            report.context.step_output("reply").unwrap()["draft"],
            "On it today."
        );
        assert_eq!(
            backend.requests()[1].messages[0].content,
            "Write a Urgent reply about Renewal"
        );
    }

    #[tokio::test]
    async fn test_skipped_step_recorded_and_run_continues() {
        let (backend, runner) = runner(vec![MockResponse::Text("Thanks!".into())]);

        let report = runner
            .run(&definition(TRIAGE), task_context(json!(null)))
            .await
            .unwrap();

        assert!(matches!(
            report.steps[0].status,
            StepStatus::Skipped { ref reason } if reason.contains("task.notes")
        ));
        assert_eq!(report.context.step_output("classify").unwrap()["skipped"], true);
        // Skipped output renders as empty in later templates.
        assert_eq!(
            backend.requests()[0].messages[0].content,
            "Write a  reply about Renewal"
        );
    }

    #[tokio::test]
    async fn test_fault_aborts_by_default() {
        let (backend, runner) = runner(vec![MockResponse::Error("quota exhausted".into())]);

        let err = runner
            .run(&definition(TRIAGE), task_context(json!("n")))
            .await
            .unwrap_err();

        match err {
            WorkflowError::StepFailed { step_id, source } => {
                assert_eq!(step_id, "classify");
                assert_eq!(source.to_string(), "Backend error: quota exhausted");
            }
            other => panic!("Expected StepFailed, got {:?}", other),
        }
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fault_with_continue_policy() {
        let toml = TRIAGE.replacen(
            "id = \"classify\"",
            "id = \"classify\"\non_error = \"continue\"",
            1,
        );
        let (_, runner) = runner(vec![
            MockResponse::Text("Neither".into()),
            MockResponse::Text("Draft".into()),
        ]);

        let report = runner
            .run(&definition(&toml), task_context(json!("n")))
            .await
            .unwrap();

        assert_eq!(report.failed_count(), 1);
        assert!(matches!(
            report.steps[0].status,
            StepStatus::Failed { ref error } if error.starts_with("Malformed response")
        ));
        assert!(report.context.step_output("classify").is_none());
        assert_eq!(report.steps[1].status, StepStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_invalid_definition_rejected_before_running() {
        let (backend, runner) = runner(vec![]);
        let mut def = definition(TRIAGE);
        def.steps[1].id = "classify".into();

        let err = runner.run(&def, WorkflowContext::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflow(_)));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_reserved_output_field_rejected_before_running() {
        let toml = TRIAGE.replacen("output_field = \"draft\"", "output_field = \"generated_at\"", 1);
        let (backend, runner) = runner(vec![MockResponse::Text("Urgent".into())]);

        let err = runner
            .run(&definition(&toml), task_context(json!("n")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflow(ref m) if m.contains("generated_at")));
        assert_eq!(backend.request_count(), 0);
    }

    #[test]
    fn test_step_report_serialization() {
        let report = StepReport {
            step_id: "classify".into(),
            status: StepStatus::Skipped {
                reason: "Field 'task.notes' is empty or missing".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "step_id": "classify",
                "status": "skipped",
                "reason": "Field 'task.notes' is empty or missing"
            })
        );
    }
}
