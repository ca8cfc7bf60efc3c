//! Per-query routing between the two answer branches.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use docent_llm::{LlmProvider, Message};

use crate::error::Result;
use crate::prompts::ROUTE_SYSTEM;

/// The two answer branches. Produced once per query; the graph dispatches on
/// it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RouteDecision {
    Documents,
    WebSearch,
}

impl RouteDecision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::WebSearch => "web-search",
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured output schema for the routing call.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RouteOutput {
    pub destination: RouteDecision,
}

pub struct Router<P: LlmProvider> {
    provider: Arc<P>,
}

impl<P: LlmProvider> Router<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Classify `question` into one of the two branches with a single
    /// constrained model call. There is no heuristic fallback: a failed or
    /// malformed response fails the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or its output does not
    /// match the schema.
    pub async fn route(&self, question: &str) -> Result<RouteDecision> {
        let messages = [Message::system(ROUTE_SYSTEM), Message::user(question)];
        let output: RouteOutput = self.provider.chat_typed(&messages).await?;
        tracing::debug!(destination = %output.destination, "query routed");
        Ok(output.destination)
    }
}
