//! Error types for docent-index.

/// Errors that can occur during ingestion and retrieval.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error reading source files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ingestion of a file whose extension names no supported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Source file exceeds the loader's size limit.
    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    /// PDF text extraction error.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// DOCX archive or XML extraction error.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Git clone error.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Tree-sitter parsing error.
    #[error("parse failed: {0}")]
    Parse(String),

    /// LLM provider error (embedding).
    #[error("LLM error: {0}")]
    Llm(#[from] docent_llm::LlmError),

    /// Vector store error.
    #[error("vector store error: {0}")]
    Store(#[from] crate::vector_store::VectorStoreError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
