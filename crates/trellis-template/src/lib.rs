//! Template resolution for Trellis workflow steps.
//!
//! Workflow step configurations embed `{{path}}` tokens that are resolved
//! against the run's context just before the step executes.
//!
//! # Components
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐   ┌──────────────────────┐
//! │ path::get/set │ ← │ TemplateEngine │ ← │ interpolate_object() │
//! └───────────────┘   └────────────────┘   └──────────────────────┘
//!                              ↑
//!                     ┌──────────────────┐   ┌──────────────────────┐
//!                     │ validate (static)│ ← │ fields (catalog)     │
//!                     └──────────────────┘   └──────────────────────┘
//! ```
//!
//! Everything here is pure and synchronous. Resolution misses never fail:
//! they render as empty strings.

pub mod engine;
pub mod fields;
pub mod interpolate;
pub mod path;
pub mod validate;

pub use engine::{MAX_DEPTH, MAX_RENDERED_LEN, TemplateEngine, has_tokens, interpolate, value_to_string};
pub use fields::{EntityType, STANDARD_FIELDS, TriggerEvent, available_fields, standard_fields};
pub use interpolate::interpolate_object;
pub use validate::{
    ValidationResult, extract_from_value, extract_variables, is_available, validate,
    validate_paths,
};
