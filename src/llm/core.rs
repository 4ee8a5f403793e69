use async_trait::async_trait;
use thiserror::Error;

/// A custom error type for LLM operations.
///
/// Provider failures of every kind (network, authentication, rate limiting,
/// malformed responses) are flattened into a message so callers handle one
/// error shape regardless of the backend.
#[derive(Error, Debug)]
pub enum LLMError {
    /// An error occurred while prompting the model.
    #[error("Failed to prompt the model: {0}")]
    PromptError(String),
}

/// A trait that defines the contract for any model a triage step can use.
///
/// The contract is deliberately narrow: one prompt in, one complete text
/// response out. Whatever the provider returns is normalized to a single
/// `String` by the implementation; callers never inspect provider-specific
/// result objects.
///
/// # Examples
///
/// ```rust
/// use inbox_triage::llm::{LLM, LLMError};
/// use async_trait::async_trait;
///
/// struct EchoLLM;
///
/// #[async_trait]
/// impl LLM for EchoLLM {
///     async fn prompt(&mut self, text: String) -> Result<String, LLMError> {
///         Ok(format!("echo: {}", text))
///     }
/// }
/// ```
#[async_trait]
pub trait LLM: Send + Sync {
    /// Sends a text prompt to the language model and returns its response text.
    ///
    /// # Errors
    ///
    /// Returns `LLMError::PromptError` for any failure of the round trip.
    async fn prompt(&mut self, text: String) -> Result<String, LLMError>;
}

#[async_trait]
impl<L: LLM + ?Sized> LLM for Box<L> {
    async fn prompt(&mut self, text: String) -> Result<String, LLMError> {
        (**self).prompt(text).await
    }
}
