use crate::llm::core::{LLM, LLMError};
use async_trait::async_trait;
use rig::{agent::Agent as RigAgent, completion::CompletionModel};
use tracing::debug;

/// Implementation of the `LLM` trait for `rig::Agent`.
///
/// Any rig agent, whatever its provider, can serve as a triage step. The
/// agent's preamble carries the role; the prompt carries the task.
///
/// ```rust,ignore
/// use inbox_triage::llm::LLM;
/// use rig::{client::CompletionClient, prelude::ProviderClient, providers::groq};
///
/// let agent = groq::Client::from_env()
///     .agent("llama-3.1-8b-instant")
///     .preamble("You are an email reader")
///     .build();
///
/// let mut llm: Box<dyn LLM> = Box::new(agent);
/// ```
#[async_trait]
impl<M> LLM for RigAgent<M>
where
    M: CompletionModel,
{
    async fn prompt(&mut self, text: String) -> Result<String, LLMError> {
        rig::completion::Prompt::prompt(self, text)
            .await
            .map(|response| response.to_string())
            .map_err(|e| {
                debug!("Rig agent error: {}", e);
                LLMError::PromptError(e.to_string())
            })
    }
}
