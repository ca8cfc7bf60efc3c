use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and return the assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response
    /// is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Send messages and deserialize the response into `T`.
    ///
    /// The default implementation calls [`LlmProvider::chat`] and parses the
    /// reply as JSON (tolerating a markdown code fence around it). Backends
    /// with native structured-output support override this.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails or the response does not
    /// deserialize into `T`.
    fn chat_typed<T>(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<T, LlmError>> + Send
    where
        T: serde::de::DeserializeOwned + schemars::JsonSchema,
        Self: Sized,
    {
        async move {
            let raw = self.chat(messages).await?;
            parse_json_reply(&raw)
        }
    }

    /// Embed text into a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails or does not support embeddings.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn supports_embeddings(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Parse an LLM reply as JSON, stripping an optional ```` ```json ```` fence
/// and any prose around the outermost object.
///
/// # Errors
///
/// Returns [`LlmError::StructuredParse`] if no JSON object deserializes.
pub fn parse_json_reply<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end)
        && start < end
    {
        return serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| LlmError::StructuredParse(e.to_string()));
    }

    Err(LlmError::StructuredParse(format!(
        "no JSON object in reply: {trimmed:.80}"
    )))
}
