//! The LLM invocation seam.
//!
//! Callers depend only on [`LlmInvoker`]; [`GeminiInvoker`] is the
//! production implementation. One call, one prompt, one completion:
//! no retries, no backoff, no fallback.

mod gemini;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use docbrief_shared::InvocationError;

pub use gemini::GeminiInvoker;

/// Sends a composed prompt to a text-generation model.
#[async_trait]
pub trait LlmInvoker: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Return the completion text, or the provider failure verbatim.
    async fn invoke(&self, prompt: &str) -> Result<String, InvocationError>;
}
