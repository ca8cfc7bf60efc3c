//! Web-search branch: formulate a query, search, synthesize.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;

use docent_llm::{LlmProvider, Message};

use crate::error::Result;
use crate::prompts::{SEARCH_ANSWER_SYSTEM, SEARCH_QUERY_SYSTEM};

/// Results fed to search synthesis per query.
pub const SEARCH_RESULT_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Web-search collaborator: query in, ranked results out.
pub trait WebSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = std::result::Result<Vec<SearchHit>, SearchError>> + Send;
}

/// Google Custom Search JSON API client.
pub struct GoogleSearch {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl std::fmt::Debug for GoogleSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSearch")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish_non_exhaustive()
    }
}

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

impl GoogleSearch {
    #[must_use]
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self {
            client: docent_llm::http::default_client(),
            api_key,
            engine_id,
            base_url: GOOGLE_SEARCH_URL.into(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn request(&self, query: &str, limit: usize) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", &limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!("search API error {status}: {text}");
            return Err(SearchError::Api(format!(
                "search request failed (status {status})"
            )));
        }

        let body: GoogleResponse = serde_json::from_str(&text)?;
        Ok(body
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchHit {
                title: item.title.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
                url: item.link.unwrap_or_default(),
            })
            .collect())
    }
}

impl WebSearch for GoogleSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        self.request(query, limit).await
    }
}

#[derive(Deserialize)]
struct GoogleResponse {
    items: Option<Vec<GoogleItem>>,
}

#[derive(Deserialize)]
struct GoogleItem {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

/// An answer synthesized from live search results.
#[derive(Debug)]
pub struct SearchAnswer {
    pub answer: String,
    /// The search query the model formulated.
    pub query: String,
}

pub struct SearchChain<P: LlmProvider, W: WebSearch> {
    provider: Arc<P>,
    search: Arc<W>,
}

impl<P: LlmProvider, W: WebSearch> SearchChain<P, W> {
    #[must_use]
    pub fn new(provider: Arc<P>, search: Arc<W>) -> Self {
        Self { provider, search }
    }

    /// Answer `question` from live web-search results.
    ///
    /// # Errors
    ///
    /// Returns an error if query formulation, the search call, or synthesis
    /// fails.
    pub async fn answer(&self, question: &str, history: &[Message]) -> Result<SearchAnswer> {
        let query = self.formulate_query(question).await?;
        let hits = self.search.search(&query, SEARCH_RESULT_COUNT).await?;
        tracing::debug!(%query, hits = hits.len(), "web search executed");

        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(Message::system(SEARCH_ANSWER_SYSTEM));
        messages.extend_from_slice(history);
        messages.push(Message::system(format_results(&hits)));
        messages.push(Message::user(question));

        let answer = self.provider.chat(&messages).await?;
        Ok(SearchAnswer { answer, query })
    }

    /// One model call turning the question into a concise query. The model
    /// is trusted to return only the query; anything past the first line is
    /// discarded.
    async fn formulate_query(&self, question: &str) -> Result<String> {
        let messages = [
            Message::system(SEARCH_QUERY_SYSTEM),
            Message::user(question),
        ];
        let raw = self.provider.chat(&messages).await?;
        let query = raw.lines().next().unwrap_or("").trim().to_owned();
        Ok(query)
    }
}

fn format_results(hits: &[SearchHit]) -> String {
    let mut out = String::from("External Info:");
    if hits.is_empty() {
        out.push_str(" (no results)");
        return out;
    }
    for hit in hits {
        let _ = write!(out, "\n\n{}\n{}\n{}", hit.title, hit.snippet, hit.url);
    }
    out
}
