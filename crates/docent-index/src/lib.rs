//! Ingestion and retrieval over a vector store.
//!
//! Documents (PDF, DOCX, HTML) and cloned repositories are loaded, split
//! into segments sized for embedding, stamped with a file identifier, and
//! upserted into the store. Retrieval embeds a query and returns the
//! top-scoring segments.

pub mod code;
pub mod error;
pub mod in_memory;
pub mod indexer;
pub mod loader;
pub mod qdrant;
pub mod repo;
pub mod retriever;
pub mod splitter;
pub mod types;
pub mod vector_store;

pub use error::{IndexError, Result};
pub use indexer::Indexer;
pub use retriever::{RetrievedSegment, Retriever};
pub use types::{Document, DocumentMetadata, Segment};
pub use vector_store::{FieldCondition, FieldValue, VectorFilter, VectorStore, VectorStoreError};
