use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
    pub extra: HashMap<String, String>,
}

impl DocumentMetadata {
    #[must_use]
    pub fn new(source: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content_type: content_type.into(),
            extra: HashMap::new(),
        }
    }
}

/// A loaded document: the full extracted text of one source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// A contiguous span of extracted text, sized for embedding. Immutable once
/// produced; the vector store owns it after indexing.
#[derive(Debug, Clone)]
pub struct Segment {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub chunk_index: usize,
}
