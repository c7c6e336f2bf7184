//! Built-in AI action executors.
//!
//! | type            | reads                  | writes (default field) |
//! |-----------------|------------------------|------------------------|
//! | `ai_generate`   | `prompt_template`      | `generated_content`    |
//! | `ai_categorize` | `field_to_analyze`     | `category`             |
//! | `ai_summarize`  | `field_to_analyze`     | `summary`              |

pub mod categorize;
pub mod generate;
pub mod summarize;

pub use categorize::{CategorizeAction, CategorizeConfig};
pub use generate::{GenerateAction, GenerateConfig};
pub use summarize::{SummarizeAction, SummarizeConfig};
