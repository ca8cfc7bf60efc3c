//! Query-time retrieval: embed the query, return the top-scoring segments.

use std::sync::Arc;

use docent_llm::LlmProvider;

use crate::error::Result;
use crate::vector_store::{ScoredVectorPoint, VectorStore};

/// Fixed result count. No re-ranking, no recency or file filtering.
pub const DEFAULT_TOP_K: u64 = 5;

/// A segment pulled back from the store for answer synthesis.
#[derive(Debug, Clone)]
pub struct RetrievedSegment {
    pub content: String,
    pub source: String,
    pub file_id: Option<i64>,
    pub score: f32,
}

impl RetrievedSegment {
    fn from_scored_point(point: ScoredVectorPoint) -> Option<Self> {
        let content = point
            .payload
            .get("content")
            .and_then(serde_json::Value::as_str)?
            .to_owned();
        let source = point
            .payload
            .get("source")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let file_id = point.payload.get("file_id").and_then(serde_json::Value::as_i64);

        Some(Self {
            content,
            source,
            file_id,
            score: point.score,
        })
    }
}

pub struct Retriever<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: u64,
}

impl<P: LlmProvider> Retriever<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            collection: collection.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: u64) -> Self {
        self.top_k = top_k;
        self
    }

    /// Return the segments most similar to `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the store search fails.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedSegment>> {
        let vector = self.provider.embed(query).await?;
        let hits = self
            .store
            .search(&self.collection, vector, self.top_k, None)
            .await?;

        Ok(hits
            .into_iter()
            .filter_map(RetrievedSegment::from_scored_point)
            .collect())
    }
}
