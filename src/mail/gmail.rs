// The `gmail` module implements the mail gateway over the Gmail REST API.

use crate::mail::draft::DraftReply;
use crate::mail::{EmailMessage, MailError, MailGateway, parser};
use crate::utils::context_hub::ContextHub;
use crate::utils::google_auth::GmailHubType;
use async_trait::async_trait;
use google_gmail1::api::{Draft, Scope};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};

const USER_ID: &str = "me";

/// A builder for [`GmailGateway`].
pub struct GmailGatewayBuilder {
    hub: Arc<ContextHub>,
}

impl GmailGatewayBuilder {
    /// Creates a new `GmailGatewayBuilder`.
    ///
    /// Registers the `Readonly` and `Compose` scopes with the provided
    /// [`ContextHub`], so one consent covers reading and drafting.
    pub fn new(hub: Arc<ContextHub>) -> Self {
        hub.add_scope(Scope::Readonly);
        hub.add_scope(Scope::Compose);
        Self { hub }
    }

    /// Builds a [`GmailGateway`], authenticating if that has not happened yet.
    pub async fn build(&self) -> Result<GmailGateway, MailError> {
        let hub = self.hub.get_hub().await?;
        Ok(GmailGateway { hub })
    }
}

/// Mail gateway backed by a user's Gmail account.
#[derive(Clone)]
pub struct GmailGateway {
    hub: GmailHubType,
}

#[async_trait]
impl MailGateway for GmailGateway {
    async fn list_messages(&self, max_results: u32) -> Result<Vec<String>, MailError> {
        let (_, list) = self
            .hub
            .users()
            .messages_list(USER_ID)
            .max_results(max_results)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let ids: Vec<String> = list
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();
        info!(count = ids.len(), "Found {} messages", ids.len());
        Ok(ids)
    }

    async fn read_message(&self, id: &str) -> Result<EmailMessage, MailError> {
        let (_, message) = self
            .hub
            .users()
            .messages_get(USER_ID, id)
            .format("full")
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(|e| map_fetch_error(id, e))?;

        let parsed = parser::parse_message(id, &message);
        debug!(
            message_id = %parsed.id,
            sender = %parsed.sender,
            subject = %parsed.subject,
            body_len = parsed.body.len(),
            "Decoded message"
        );
        Ok(parsed)
    }

    async fn create_draft(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, MailError> {
        let raw = DraftReply { to, subject, body }.to_rfc822()?;
        let mime = "message/rfc822"
            .parse()
            .map_err(|e| MailError::Compose(format!("invalid upload type: {e}")))?;

        let (_, draft) = self
            .hub
            .users()
            .drafts_create(Draft::default(), USER_ID)
            .add_scope(Scope::Compose)
            .upload(Cursor::new(raw), mime)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let draft_id = saved_draft_id(draft)?;
        info!(draft_id = %draft_id, "Draft created");
        Ok(draft_id)
    }
}

fn saved_draft_id(draft: Draft) -> Result<String, MailError> {
    draft
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MailError::Transport("draft created without id".to_string()))
}

fn map_fetch_error(id: &str, error: google_gmail1::Error) -> MailError {
    let not_found = match &error {
        google_gmail1::Error::BadRequest(body) => body["error"]["code"].as_i64() == Some(404),
        google_gmail1::Error::Failure(response) => response.status().as_u16() == 404,
        _ => false,
    };
    if not_found {
        MailError::NotFound(id.to_string())
    } else {
        MailError::Transport(error.to_string())
    }
}
