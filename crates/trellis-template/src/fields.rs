//! Static catalog of context fields available to workflow templates.
//!
//! The standard fields are present in every run. Each entity type adds the
//! fields of the record that triggered the workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fields every workflow context carries, regardless of trigger.
///
/// Entries act as prefixes: `trigger` makes `trigger.anything` available.
pub const STANDARD_FIELDS: &[&str] = &[
    "trigger",
    "steps",
    "loop",
    "organization_id",
    "triggered_by_user_id",
    "triggered_at",
];

const CONTACT_FIELDS: &[&str] = &[
    "contact.id",
    "contact.first_name",
    "contact.last_name",
    "contact.full_name",
    "contact.email",
    "contact.phone",
    "contact.company",
    "contact.title",
    "contact.status",
    "contact.source",
    "contact.tags",
    "contact.notes",
    "contact.owner_id",
    "contact.created_at",
    "contact.updated_at",
];

const TASK_FIELDS: &[&str] = &[
    "task.id",
    "task.title",
    "task.description",
    "task.notes",
    "task.status",
    "task.priority",
    "task.due_date",
    "task.assigned_to",
    "task.project_id",
    "task.contact_id",
    "task.created_at",
    "task.completed_at",
];

const OPPORTUNITY_FIELDS: &[&str] = &[
    "opportunity.id",
    "opportunity.name",
    "opportunity.value",
    "opportunity.currency",
    "opportunity.stage",
    "opportunity.probability",
    "opportunity.expected_close_date",
    "opportunity.contact_id",
    "opportunity.company",
    "opportunity.owner_id",
    "opportunity.notes",
    "opportunity.created_at",
];

const PROJECT_FIELDS: &[&str] = &[
    "project.id",
    "project.name",
    "project.description",
    "project.status",
    "project.phase",
    "project.start_date",
    "project.end_date",
    "project.budget",
    "project.client_id",
    "project.owner_id",
    "project.created_at",
];

/// Record types a workflow can be triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Contact,
    Task,
    Opportunity,
    Project,
}

impl EntityType {
    /// All entity types, in catalog order.
    pub const ALL: [EntityType; 4] = [
        EntityType::Contact,
        EntityType::Task,
        EntityType::Opportunity,
        EntityType::Project,
    ];

    /// The top-level context key holding this entity's record.
    pub fn context_key(&self) -> &'static str {
        match self {
            EntityType::Contact => "contact",
            EntityType::Task => "task",
            EntityType::Opportunity => "opportunity",
            EntityType::Project => "project",
        }
    }

    /// Fields of this entity's schema, as template paths.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Contact => CONTACT_FIELDS,
            EntityType::Task => TASK_FIELDS,
            EntityType::Opportunity => OPPORTUNITY_FIELDS,
            EntityType::Project => PROJECT_FIELDS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.context_key())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|e| e.context_key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown entity type '{s}' (expected contact, task, opportunity or project)")
            })
    }
}

/// Events that start a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    ContactCreated,
    ContactUpdated,
    TaskCreated,
    TaskDue,
    TaskCompleted,
    OpportunityCreated,
    OpportunityStageChanged,
    ProjectCreated,
    ProjectPhaseChanged,
}

impl TriggerEvent {
    /// The entity type whose record accompanies this event.
    pub fn entity_type(&self) -> EntityType {
        match self {
            TriggerEvent::ContactCreated | TriggerEvent::ContactUpdated => EntityType::Contact,
            TriggerEvent::TaskCreated | TriggerEvent::TaskDue | TriggerEvent::TaskCompleted => {
                EntityType::Task
            }
            TriggerEvent::OpportunityCreated | TriggerEvent::OpportunityStageChanged => {
                EntityType::Opportunity
            }
            TriggerEvent::ProjectCreated | TriggerEvent::ProjectPhaseChanged => EntityType::Project,
        }
    }

    /// Wire name of the event (e.g. `"task_due"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::ContactCreated => "contact_created",
            TriggerEvent::ContactUpdated => "contact_updated",
            TriggerEvent::TaskCreated => "task_created",
            TriggerEvent::TaskDue => "task_due",
            TriggerEvent::TaskCompleted => "task_completed",
            TriggerEvent::OpportunityCreated => "opportunity_created",
            TriggerEvent::OpportunityStageChanged => "opportunity_stage_changed",
            TriggerEvent::ProjectCreated => "project_created",
            TriggerEvent::ProjectPhaseChanged => "project_phase_changed",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The standard fields as owned strings.
pub fn standard_fields() -> Vec<String> {
    STANDARD_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Standard fields plus the schema fields of `entity`.
pub fn available_fields(entity: EntityType) -> Vec<String> {
    STANDARD_FIELDS
        .iter()
        .chain(entity.fields())
        .map(|f| f.to_string())
        .collect()
}
