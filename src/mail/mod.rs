// The `mail` module is the gateway to the mailbox: listing, reading and drafting.

pub mod draft;
pub mod gmail;
pub mod parser;

use crate::utils::google_auth::AuthError;
use async_trait::async_trait;
use thiserror::Error;

pub use gmail::{GmailGateway, GmailGatewayBuilder};

/// The `MailError` enum defines the failures a mail gateway can report.
#[derive(Debug, Error)]
pub enum MailError {
    /// Authentication with the mail service failed.
    #[error("Mail authentication failed: {0}")]
    Auth(#[from] AuthError),
    /// The requested message does not exist.
    #[error("Message {0} not found")]
    NotFound(String),
    /// The mail service could not be reached or rejected the request.
    #[error("Mail transport error: {0}")]
    Transport(String),
    /// The outgoing message could not be assembled.
    #[error("Failed to compose message: {0}")]
    Compose(String),
}

/// A decoded email, normalized to the fields the triage steps need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// The provider's message id.
    pub id: String,
    /// The raw `From` header, e.g. `Alice <alice@example.com>`.
    pub sender: String,
    pub subject: String,
    /// Best-effort plain text; never raw MIME.
    pub body: String,
    pub body_html: String,
}

/// The operations the triage pipeline needs from a mailbox.
#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Returns up to `max_results` message ids, newest first, in service order.
    async fn list_messages(&self, max_results: u32) -> Result<Vec<String>, MailError>;

    /// Fetches and decodes a single message.
    async fn read_message(&self, id: &str) -> Result<EmailMessage, MailError>;

    /// Saves an unsent plain-text draft and returns the draft id.
    async fn create_draft(&self, to: &str, subject: &str, body: &str)
    -> Result<String, MailError>;
}
