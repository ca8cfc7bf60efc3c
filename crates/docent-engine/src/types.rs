//! Request/response contract types (shape only; transport lives elsewhere).

use serde::{Deserialize, Serialize};

use crate::router::RouteDecision;

/// Chat models the service exposes to callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "gpt-4.1-nano")]
    Gpt41Nano,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl ModelChoice {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpt41Nano => "gpt-4.1-nano",
            Self::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub session_id: String,
    pub model: ModelChoice,
    pub source: RouteDecision,
}

impl QueryResponse {
    /// Build a response, minting a session id when the request carried none.
    #[must_use]
    pub fn new(request: &QueryRequest, answer: String, source: RouteDecision) -> Self {
        Self {
            answer,
            session_id: request
                .session_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            model: request.model.unwrap_or_default(),
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub file_id: i64,
}
