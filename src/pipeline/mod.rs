// The `pipeline` module runs one triage pass: fetch, summarize, classify, draft.

pub mod decision;
pub mod prompts;
pub mod roles;

use crate::llm::{LLM, LLMError};
use crate::mail::{EmailMessage, MailError, MailGateway};
use crate::utils::{TEngine, TEngineError};
use chrono::Local;
use serde_json::json;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub use decision::{Classification, DRAFT_DEBUG_MARKER, NO_REPLY_SENTINEL, clean_draft};
pub use roles::AgentRole;

/// Prefix added to the original subject of a drafted reply.
pub const REPLY_PREFIX: &str = "Re: ";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Mail gateway error: {0}")]
    Mail(#[from] MailError),
    #[error("{step} step failed: {source}")]
    Llm {
        step: &'static str,
        #[source]
        source: LLMError,
    },
    #[error("Prompt template error: {0}")]
    Template(#[from] TEngineError),
}

/// How a triage run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mailbox had no messages.
    NoMessages,
    /// The latest message had no readable body.
    EmptyBody { message_id: String },
    /// The decider said no reply is needed.
    NoReplyNeeded {
        message_id: String,
        summary: String,
        label: Classification,
    },
    /// A reply was needed but the drafter produced nothing usable.
    NoDraft {
        message_id: String,
        summary: String,
        label: Classification,
    },
    /// A reply draft was saved.
    Drafted {
        message_id: String,
        summary: String,
        label: Classification,
        draft_id: String,
    },
}

/// The three models the pipeline talks to, one per [`AgentRole`].
pub struct TriageAgents {
    pub reader: Box<dyn LLM>,
    pub decider: Box<dyn LLM>,
    pub drafter: Box<dyn LLM>,
}

impl TriageAgents {
    fn get_mut(&mut self, role: AgentRole) -> &mut dyn LLM {
        match role {
            AgentRole::Reader => self.reader.as_mut(),
            AgentRole::Decider => self.decider.as_mut(),
            AgentRole::Drafter => self.drafter.as_mut(),
        }
    }
}

/// Triage of the newest email in a mailbox.
///
/// A run makes at most three model calls, strictly in sequence, and at most
/// one mailbox write: the draft, created only once its text is final. Drafts
/// are never sent.
pub struct TriagePipeline {
    gateway: Box<dyn MailGateway>,
    agents: TriageAgents,
    prompts: TEngine,
}

impl TriagePipeline {
    pub fn new(gateway: Box<dyn MailGateway>, agents: TriageAgents) -> Result<Self, PipelineError> {
        Ok(Self {
            gateway,
            agents,
            prompts: prompts::prompt_engine()?,
        })
    }

    /// Processes the newest message once.
    pub async fn run(&mut self) -> Result<Outcome, PipelineError> {
        let span = info_span!("triage_run", run_id = %Uuid::new_v4());
        self.run_once().instrument(span).await
    }

    async fn run_once(&mut self) -> Result<Outcome, PipelineError> {
        info!("Starting automated email handling at {}", Local::now());

        let Some(email) = self.fetch_latest().await? else {
            info!("No new messages found");
            return Ok(Outcome::NoMessages);
        };
        let message_id = email.id.clone();

        if email.body.trim().is_empty() {
            warn!(message_id = %message_id, "Empty email body, skipping");
            return Ok(Outcome::EmptyBody { message_id });
        }

        info!(message_id = %message_id, subject = %email.subject, "Processing latest email");

        let summary = self
            .ask(
                AgentRole::Reader,
                prompts::SUMMARIZE,
                &json!({
                    "subject": email.subject,
                    "sender": email.sender,
                    "body": email.body,
                }),
            )
            .await?;
        info!("Reader summary: {}", summary);

        let label = Classification::new(
            &self
                .ask(
                    AgentRole::Decider,
                    prompts::CLASSIFY,
                    &json!({ "body": email.body, "labels": prompts::REPLY_LABELS }),
                )
                .await?,
        );
        info!(label = %label, "Decision");

        if !label.requires_reply() {
            info!("No reply needed for this email, skipping draft creation");
            return Ok(Outcome::NoReplyNeeded {
                message_id,
                summary,
                label,
            });
        }

        info!("Generating draft reply");
        let raw_draft = self
            .ask(
                AgentRole::Drafter,
                prompts::DRAFT,
                &json!({ "body": email.body, "label": label }),
            )
            .await?;

        let Some(draft) = clean_draft(&raw_draft) else {
            warn!("No valid draft generated");
            return Ok(Outcome::NoDraft {
                message_id,
                summary,
                label,
            });
        };
        debug!("Draft reply:\n{}", draft);

        let subject = format!("{REPLY_PREFIX}{}", email.subject);
        let draft_id = self
            .gateway
            .create_draft(&email.sender, &subject, &draft)
            .await?;
        info!(draft_id = %draft_id, to = %email.sender, "Draft saved to the mailbox");

        Ok(Outcome::Drafted {
            message_id,
            summary,
            label,
            draft_id,
        })
    }

    async fn fetch_latest(&self) -> Result<Option<EmailMessage>, PipelineError> {
        let ids = self.gateway.list_messages(1).await?;
        let Some(id) = ids.first() else {
            return Ok(None);
        };
        Ok(Some(self.gateway.read_message(id).await?))
    }

    async fn ask(
        &mut self,
        role: AgentRole,
        template: &str,
        data: &serde_json::Value,
    ) -> Result<String, PipelineError> {
        let prompt = self.prompts.render(template, data)?;
        debug!(role = role.name(), "Prompt: {}", prompt);
        self.agents
            .get_mut(role)
            .prompt(prompt)
            .await
            .map_err(|source| PipelineError::Llm {
                step: role.name(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<(AgentRole, String)>>>;
    type DraftLog = Arc<Mutex<Vec<(String, String, String)>>>;

    #[derive(Clone, Default)]
    struct FakeGateway {
        ids: Vec<String>,
        message: Option<EmailMessage>,
        drafts: DraftLog,
    }

    #[async_trait]
    impl MailGateway for FakeGateway {
        async fn list_messages(&self, max_results: u32) -> Result<Vec<String>, MailError> {
            Ok(self.ids.iter().take(max_results as usize).cloned().collect())
        }

        async fn read_message(&self, id: &str) -> Result<EmailMessage, MailError> {
            self.message
                .clone()
                .ok_or_else(|| MailError::NotFound(id.to_string()))
        }

        async fn create_draft(
            &self,
            to: &str,
            subject: &str,
            body: &str,
        ) -> Result<String, MailError> {
            let mut drafts = self.drafts.lock().unwrap();
            drafts.push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(format!("draft-{}", drafts.len()))
        }
    }

    struct ScriptedLLM {
        role: AgentRole,
        replies: VecDeque<Result<String, LLMError>>,
        calls: CallLog,
    }

    #[async_trait]
    impl LLM for ScriptedLLM {
        async fn prompt(&mut self, text: String) -> Result<String, LLMError> {
            self.calls.lock().unwrap().push((self.role, text));
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(LLMError::PromptError("no scripted reply".to_string())))
        }
    }

    fn scripted(role: AgentRole, reply: Result<&str, &str>, calls: &CallLog) -> Box<dyn LLM> {
        let reply = reply
            .map(str::to_string)
            .map_err(|e| LLMError::PromptError(e.to_string()));
        Box::new(ScriptedLLM {
            role,
            replies: VecDeque::from([reply]),
            calls: calls.clone(),
        })
    }

    fn agents(
        summary: Result<&str, &str>,
        label: Result<&str, &str>,
        draft: Result<&str, &str>,
        calls: &CallLog,
    ) -> TriageAgents {
        TriageAgents {
            reader: scripted(AgentRole::Reader, summary, calls),
            decider: scripted(AgentRole::Decider, label, calls),
            drafter: scripted(AgentRole::Drafter, draft, calls),
        }
    }

    fn inbox_with(body: &str) -> FakeGateway {
        FakeGateway {
            ids: vec!["msg-2".to_string(), "msg-1".to_string()],
            message: Some(EmailMessage {
                id: "msg-2".to_string(),
                sender: "Alice <alice@example.com>".to_string(),
                subject: "Lunch on Friday?".to_string(),
                body: body.to_string(),
                body_html: String::new(),
            }),
            drafts: DraftLog::default(),
        }
    }

    fn roles_called(calls: &CallLog) -> Vec<AgentRole> {
        calls.lock().unwrap().iter().map(|(role, _)| *role).collect()
    }

    #[tokio::test]
    async fn empty_mailbox_ends_without_model_calls() {
        // --- 1. Arrange ---
        let calls = CallLog::default();
        let gateway = FakeGateway::default();
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(Ok("summary"), Ok("follow-up"), Ok("reply"), &calls),
        )
        .unwrap();

        // --- 2. Act ---
        let outcome = pipeline.run().await.unwrap();

        // --- 3. Assert ---
        assert_eq!(outcome, Outcome::NoMessages);
        assert!(calls.lock().unwrap().is_empty());
        assert!(drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_skipped() {
        let calls = CallLog::default();
        let mut pipeline = TriagePipeline::new(
            Box::new(inbox_with("  \n ")),
            agents(Ok("summary"), Ok("follow-up"), Ok("reply"), &calls),
        )
        .unwrap();

        let outcome = pipeline.run().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::EmptyBody {
                message_id: "msg-2".to_string()
            }
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_reply_label_skips_drafting() {
        let calls = CallLog::default();
        let gateway = inbox_with("Your receipt for order #42");
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(Ok("A receipt."), Ok("No Reply Needed"), Ok("reply"), &calls),
        )
        .unwrap();

        let outcome = pipeline.run().await.unwrap();

        assert!(matches!(outcome, Outcome::NoReplyNeeded { ref label, .. } if label.label() == "no reply needed"));
        assert_eq!(roles_called(&calls), vec![AgentRole::Reader, AgentRole::Decider]);
        assert!(drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reply_is_drafted_to_sender_with_re_subject() {
        let calls = CallLog::default();
        let gateway = inbox_with("Are you free for lunch on Friday?");
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(
                Ok("Alice asks about lunch."),
                Ok("Follow-Up"),
                Ok("Hi Alice,\n\nFriday works for me.\n"),
                &calls,
            ),
        )
        .unwrap();

        let outcome = pipeline.run().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Drafted {
                message_id: "msg-2".to_string(),
                summary: "Alice asks about lunch.".to_string(),
                label: Classification::new("follow-up"),
                draft_id: "draft-1".to_string(),
            }
        );
        let drafts = drafts.lock().unwrap();
        assert_eq!(drafts.len(), 1);
        let (to, subject, body) = &drafts[0];
        assert_eq!(to, "Alice <alice@example.com>");
        assert_eq!(subject, "Re: Lunch on Friday?");
        assert_eq!(body, "Hi Alice,\n\nFriday works for me.");
    }

    #[tokio::test]
    async fn steps_run_in_order_with_their_context() {
        let calls = CallLog::default();
        let mut pipeline = TriagePipeline::new(
            Box::new(inbox_with("Are you free for lunch on Friday?")),
            agents(Ok("summary"), Ok("follow-up"), Ok("Sure!"), &calls),
        )
        .unwrap();

        pipeline.run().await.unwrap();

        let calls = calls.lock().unwrap();
        let roles: Vec<_> = calls.iter().map(|(role, _)| *role).collect();
        assert_eq!(
            roles,
            vec![AgentRole::Reader, AgentRole::Decider, AgentRole::Drafter]
        );
        assert!(calls[0].1.contains("Subject: Lunch on Friday?"));
        assert!(calls[0].1.contains("From: Alice <alice@example.com>"));
        assert!(calls[1].1.contains("Are you free for lunch on Friday?"));
        assert!(calls[2].1.contains("the decision result (follow-up)"));
    }

    #[tokio::test]
    async fn draft_is_truncated_at_debug_marker() {
        let calls = CallLog::default();
        let gateway = inbox_with("Can you send the slides?");
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(
                Ok("Slides request."),
                Ok("information request"),
                Ok("Hi,\n\nAttached are the slides.\nType of draft_result: <class 'CrewOutput'>"),
                &calls,
            ),
        )
        .unwrap();

        pipeline.run().await.unwrap();

        let drafts = drafts.lock().unwrap();
        assert_eq!(drafts[0].2, "Hi,\n\nAttached are the slides.");
        assert!(!drafts[0].2.contains(DRAFT_DEBUG_MARKER));
    }

    #[tokio::test]
    async fn empty_draft_is_not_saved() {
        let calls = CallLog::default();
        let gateway = inbox_with("Can you send the slides?");
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(Ok("Slides request."), Ok("follow-up"), Ok("   "), &calls),
        )
        .unwrap();

        let outcome = pipeline.run().await.unwrap();

        assert!(matches!(outcome, Outcome::NoDraft { .. }));
        assert!(drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_failure_ends_run_without_draft() {
        let calls = CallLog::default();
        let gateway = inbox_with("Can you send the slides?");
        let drafts = gateway.drafts.clone();
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(Ok("Slides request."), Err("rate limited"), Ok("Sure"), &calls),
        )
        .unwrap();

        let result = pipeline.run().await;

        match result {
            Err(PipelineError::Llm { step, .. }) => assert_eq!(step, "Response Decider"),
            other => panic!("Expected a decider failure, but got {:?}", other),
        }
        assert_eq!(roles_called(&calls), vec![AgentRole::Reader, AgentRole::Decider]);
        assert!(drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_message_is_a_mail_error() {
        let calls = CallLog::default();
        let gateway = FakeGateway {
            ids: vec!["gone".to_string()],
            ..Default::default()
        };
        let mut pipeline = TriagePipeline::new(
            Box::new(gateway),
            agents(Ok("summary"), Ok("follow-up"), Ok("reply"), &calls),
        )
        .unwrap();

        let result = pipeline.run().await;

        assert!(matches!(
            result,
            Err(PipelineError::Mail(MailError::NotFound(ref id))) if id == "gone"
        ));
        assert!(calls.lock().unwrap().is_empty());
    }
}
