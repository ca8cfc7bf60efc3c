//! History-aware reformulation: rewrite a follow-up into a standalone
//! question before retrieval.

use std::sync::Arc;

use docent_llm::{LlmProvider, Message};

use crate::error::Result;
use crate::prompts::CONTEXTUALIZE_SYSTEM;

pub struct Reformulator<P: LlmProvider> {
    provider: Arc<P>,
}

impl<P: LlmProvider> Reformulator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Produce a standalone question from `question` and prior turns.
    ///
    /// With no history there is nothing to resolve, so the question passes
    /// through without a model call. Errors propagate; there is no
    /// deterministic fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails.
    pub async fn reformulate(&self, question: &str, history: &[Message]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_owned());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(CONTEXTUALIZE_SYSTEM));
        messages.extend_from_slice(history);
        messages.push(Message::user(question));

        let standalone = self.provider.chat(&messages).await?;
        let standalone = standalone.trim();
        tracing::debug!(%standalone, "question reformulated");
        Ok(standalone.to_owned())
    }
}
