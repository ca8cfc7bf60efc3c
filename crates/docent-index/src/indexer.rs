//! Ingestion orchestrator: load → split → stamp → embed → store.
//!
//! Ingestion is best-effort: every internal error is caught, logged, and
//! reported as a boolean failure so a bad upload never takes the service
//! down. The live query path has no such containment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use docent_llm::LlmProvider;

use crate::code::CodeSplitter;
use crate::error::Result;
use crate::loader::{DEFAULT_MAX_FILE_SIZE, loader_for};
use crate::repo::RepoLoader;
use crate::splitter::{SplitterConfig, TextSplitter};
use crate::types::Segment;
use crate::vector_store::{VectorFilter, VectorPoint, VectorStore};

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub collection: String,
    pub max_file_size: u64,
    pub clone_workdir: PathBuf,
    pub prose: SplitterConfig,
    pub code_chunk_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            collection: "docent_segments".into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            clone_workdir: std::env::temp_dir().join("docent-repos"),
            prose: SplitterConfig::default(),
            code_chunk_size: 500,
        }
    }
}

pub struct Indexer<P: LlmProvider> {
    store: Arc<dyn VectorStore>,
    provider: Arc<P>,
    prose: TextSplitter,
    code: CodeSplitter,
    repo: RepoLoader,
    collection: String,
    max_file_size: u64,
}

impl<P: LlmProvider> Indexer<P> {
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, provider: Arc<P>, config: IndexerConfig) -> Self {
        Self {
            store,
            provider,
            prose: TextSplitter::new(config.prose),
            code: CodeSplitter::new(config.code_chunk_size),
            repo: RepoLoader::new(config.clone_workdir),
            collection: config.collection,
            max_file_size: config.max_file_size,
        }
    }

    /// Index one document file, stamping every segment with `file_id`.
    ///
    /// Returns `true` on success. Any loading, splitting, embedding, or
    /// store error is logged and reported as `false`.
    pub async fn index_file(&self, path: &Path, file_id: i64) -> bool {
        match self.try_index_file(path, file_id).await {
            Ok(count) => {
                tracing::info!(file_id, count, path = %path.display(), "document indexed");
                true
            }
            Err(e) => {
                tracing::error!(file_id, path = %path.display(), "document indexing failed: {e}");
                false
            }
        }
    }

    /// Clone and index a repository's Python sources under `file_id`.
    ///
    /// Returns `true` on success; failures are logged and reported as
    /// `false`, like [`Indexer::index_file`].
    pub async fn index_repository(&self, url: &str, file_id: i64) -> bool {
        match self.try_index_repository(url, file_id).await {
            Ok(count) => {
                tracing::info!(file_id, count, %url, "repository indexed");
                true
            }
            Err(e) => {
                tracing::error!(file_id, %url, "repository indexing failed: {e}");
                false
            }
        }
    }

    /// Remove every segment stamped with `file_id`.
    ///
    /// Idempotent: deleting an identifier with no matching segments is
    /// success. Store errors are logged and reported as `false`.
    pub async fn delete(&self, file_id: i64) -> bool {
        let filter = VectorFilter::field_eq("file_id", file_id);
        match self.store.delete_by_filter(&self.collection, filter).await {
            Ok(()) => {
                tracing::info!(file_id, "segments deleted");
                true
            }
            Err(e) => {
                tracing::error!(file_id, "segment deletion failed: {e}");
                false
            }
        }
    }

    async fn try_index_file(&self, path: &Path, file_id: i64) -> Result<usize> {
        let loader = loader_for(path, self.max_file_size)?;
        let documents = loader.load(path).await?;

        let mut segments = Vec::new();
        for doc in &documents {
            segments.extend(self.prose.split(doc));
        }

        self.ingest(segments, file_id).await
    }

    async fn try_index_repository(&self, url: &str, file_id: i64) -> Result<usize> {
        let documents = self.repo.load(url).await?;

        let mut segments = Vec::new();
        for doc in &documents {
            segments.extend(self.code.split(doc)?);
        }

        self.ingest(segments, file_id).await
    }

    async fn ingest(&self, segments: Vec<Segment>, file_id: i64) -> Result<usize> {
        if segments.is_empty() {
            return Ok(0);
        }

        let mut points = Vec::with_capacity(segments.len());
        let mut collection_ready = false;

        for segment in &segments {
            let vector = self.provider.embed(&segment.content).await?;

            if !collection_ready {
                let size = u64::try_from(vector.len()).unwrap_or(u64::MAX);
                self.store.ensure_collection(&self.collection, size).await?;
                collection_ready = true;
            }

            points.push(VectorPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                payload: segment_payload(segment, file_id),
            });
        }

        let count = points.len();
        self.store.upsert(&self.collection, points).await?;
        Ok(count)
    }
}

fn segment_payload(segment: &Segment, file_id: i64) -> HashMap<String, serde_json::Value> {
    HashMap::from([
        ("file_id".to_owned(), json!(file_id)),
        ("source".to_owned(), json!(segment.metadata.source)),
        (
            "content_type".to_owned(),
            json!(segment.metadata.content_type),
        ),
        ("chunk_index".to_owned(), json!(segment.chunk_index)),
        ("content".to_owned(), json!(segment.content)),
    ])
}
