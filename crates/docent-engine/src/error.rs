//! Error type for the live query path.
//!
//! Unlike ingestion, nothing here is contained: a failure in routing,
//! reformulation, retrieval, search, or synthesis aborts the whole query.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("LLM error: {0}")]
    Llm(#[from] docent_llm::LlmError),

    #[error("retrieval error: {0}")]
    Index(#[from] docent_index::IndexError),

    #[error("web search error: {0}")]
    Search(#[from] crate::search::SearchError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
