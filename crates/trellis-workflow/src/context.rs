//! Per-run workflow context.
//!
//! The context is a JSON tree owned by a single run. It is seeded from the
//! trigger and grows one `steps.<id>.output` entry per executed step:
//!
//! ```text
//! {
//!   "trigger": { "event": "task_due", ... },
//!   "task": { "title": "...", "notes": "..." },
//!   "organization_id": "org_1",
//!   "triggered_by_user_id": "user_9",
//!   "triggered_at": "2026-03-02T09:00:00+00:00",
//!   "steps": { "classify": { "output": { "success": true, "category": "Urgent" } } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use trellis_template::{TemplateEngine, TriggerEvent, path};

use crate::action::ActionResult;

/// The key/value tree a workflow run reads from and writes step outputs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowContext {
    data: Value,
    #[serde(skip)]
    engine: TemplateEngine,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowContext {
    /// An empty context.
    pub fn new() -> Self {
        Self {
            data: Value::Object(Map::new()),
            engine: TemplateEngine::default(),
        }
    }

    /// Wrap an existing JSON value. Non-object roots are replaced by an empty map.
    pub fn from_value(data: Value) -> Self {
        let data = match data {
            Value::Object(_) => data,
            _ => Value::Object(Map::new()),
        };
        Self {
            data,
            engine: TemplateEngine::default(),
        }
    }

    /// Seed a context for a trigger firing on `entity`.
    pub fn for_trigger(
        event: TriggerEvent,
        entity: Value,
        organization_id: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        let entity_type = event.entity_type();
        let mut data = Map::new();
        data.insert(
            "trigger".into(),
            json!({ "event": event.as_str(), "entity_type": entity_type.context_key() }),
        );
        data.insert(entity_type.context_key().into(), entity);
        data.insert("organization_id".into(), Value::String(organization_id.into()));
        data.insert(
            "triggered_by_user_id".into(),
            user_id.map_or(Value::Null, Value::String),
        );
        data.insert(
            "triggered_at".into(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        data.insert("steps".into(), Value::Object(Map::new()));
        Self::from_value(Value::Object(data))
    }

    /// Use `engine` for all interpolation through this context.
    pub fn with_engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The template engine used by [`interpolate`](Self::interpolate).
    pub fn engine(&self) -> TemplateEngine {
        self.engine
    }

    /// Resolve a dotted path, e.g. `contact.emails[0]`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path::get(&self.data, path)
    }

    /// Assign a value at a dotted path, creating intermediate maps.
    pub fn set(&mut self, path: &str, value: Value) {
        path::set(&mut self.data, path, value);
    }

    /// A new context with `result` merged under `steps.<step_id>.output`.
    pub fn with_step_output(&self, step_id: &str, result: &ActionResult) -> Self {
        let mut next = self.clone();
        next.set(
            &format!("steps.{}.output", step_id),
            Value::Object(result.output.clone()),
        );
        next
    }

    /// Output previously recorded for `step_id`.
    pub fn step_output(&self, step_id: &str) -> Option<&Value> {
        self.data.get("steps")?.get(step_id)?.get("output")
    }

    /// Render a template string against this context.
    pub fn interpolate(&self, template: &str) -> String {
        self.engine.render(template, &self.data)
    }

    /// Render every string inside `value` against this context.
    pub fn interpolate_value(&self, value: &Value) -> Value {
        self.engine.render_value(value, &self.data)
    }

    /// The underlying JSON tree.
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    /// Consume the context, returning the JSON tree.
    pub fn into_value(self) -> Value {
        self.data
    }
}
