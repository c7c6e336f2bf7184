//! LLM client abstraction for Trellis workflow actions.
//!
//! Workflow AI actions need a single capability: send a prompt, get text
//! back. This crate provides that through the [`LlmBackend`] trait with
//! implementations for the Anthropic Messages API and any OpenAI-compatible
//! chat completions endpoint (OpenAI, Groq, Ollama).
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  LlmBackend trait                       │
//! │  - complete() -> CompletionResponse     │
//! └─────────────────────────────────────────┘
//!                    │
//!     ┌──────────────┼──────────────┐
//!     ▼              ▼              ▼
//! ┌─────────┐  ┌──────────┐  ┌────────────┐
//! │Anthropic│  │  OpenAI  │  │MockBackend │
//! └─────────┘  └──────────┘  └────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod types;

// Provider implementations
pub mod anthropic;
pub mod openai;

pub use backend::{LlmBackend, MockBackend, MockResponse, SharedBackend, with_retry};
pub use error::{LlmError, RateLimitInfo, Result};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use openai::{OpenAiBackend, OpenAiConfig};
