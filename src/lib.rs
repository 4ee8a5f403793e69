//! # inbox-triage: summarize the newest email, decide whether it needs an answer, draft one.

/// The `config` module reads the run configuration from the environment.
pub mod config;
/// The `llm` module provides a trait for interacting with language models.
pub mod llm;
/// The `mail` module lists, reads and drafts mail through a gateway trait.
pub mod mail;
/// The `pipeline` module runs the fetch, summarize, classify, draft sequence.
pub mod pipeline;
/// The `utils` module provides Google authentication and prompt templating.
pub mod utils;

pub use config::TriageConfig;
pub use mail::{EmailMessage, GmailGateway, GmailGatewayBuilder, MailGateway};
pub use pipeline::{Outcome, TriageAgents, TriagePipeline};
pub use utils::context_hub::ContextHub;
