// The `llm` module defines the text-generation seam the triage steps call through.

pub mod adapters;
pub mod core;

pub use self::core::{LLM, LLMError};
