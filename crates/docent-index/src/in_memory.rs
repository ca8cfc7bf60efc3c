//! In-memory [`VectorStore`] for tests and offline development.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::RwLock;

use crate::vector_store::{
    FieldValue, ScoredVectorPoint, StoredVectorPoint, VectorFilter, VectorPoint, VectorStore,
    VectorStoreError,
};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

struct StoredPoint {
    vector: Vec<f32>,
    payload: HashMap<String, serde_json::Value>,
}

pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, StoredPoint>>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of points in a collection (0 if it does not exist).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .map_or(0, HashMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn matches_filter(payload: &HashMap<String, serde_json::Value>, filter: &VectorFilter) -> bool {
    filter.must.iter().all(|cond| {
        payload
            .get(&cond.field)
            .is_some_and(|val| match &cond.value {
                FieldValue::Integer(i) => val.as_i64() == Some(*i),
                FieldValue::Text(s) => val.as_str() == Some(s.as_str()),
            })
    })
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        _vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            cols.entry(collection).or_default();
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let col = cols.entry(collection).or_default();
            for p in points {
                col.insert(
                    p.id,
                    StoredPoint {
                        vector: p.vector,
                        payload: p.payload,
                    },
                );
            }
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<VectorFilter>,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let Some(col) = cols.get(&collection) else {
                return Ok(Vec::new());
            };

            let mut scored: Vec<ScoredVectorPoint> = col
                .iter()
                .filter(|(_, p)| {
                    filter
                        .as_ref()
                        .is_none_or(|f| matches_filter(&p.payload, f))
                })
                .map(|(id, p)| ScoredVectorPoint {
                    id: id.clone(),
                    score: cosine_similarity(&vector, &p.vector),
                    payload: p.payload.clone(),
                })
                .collect();

            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
            scored.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(scored)
        })
    }

    fn delete_by_filter(
        &self,
        collection: &str,
        filter: VectorFilter,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Delete(e.to_string()))?;
            if let Some(col) = cols.get_mut(&collection) {
                col.retain(|_, p| !matches_filter(&p.payload, &filter));
            }
            Ok(())
        })
    }

    fn get_by_filter(
        &self,
        collection: &str,
        filter: VectorFilter,
    ) -> BoxFuture<'_, Result<Vec<StoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Scroll(e.to_string()))?;
            let Some(col) = cols.get(&collection) else {
                return Ok(Vec::new());
            };

            Ok(col
                .iter()
                .filter(|(_, p)| matches_filter(&p.payload, &filter))
                .map(|(id, p)| StoredVectorPoint {
                    id: id.clone(),
                    payload: p.payload.clone(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: &str, vector: Vec<f32>, file_id: i64) -> VectorPoint {
        VectorPoint {
            id: id.into(),
            vector,
            payload: HashMap::from([
                ("file_id".to_owned(), json!(file_id)),
                ("content".to_owned(), json!(format!("content of {id}"))),
            ]),
        }
    }

    #[tokio::test]
    async fn upsert_and_search_ranked() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(
                "col",
                vec![
                    point("a", vec![1.0, 0.0], 1),
                    point("b", vec![0.0, 1.0], 1),
                    point("c", vec![0.9, 0.1], 2),
                ],
            )
            .await
            .unwrap();

        let hits = store.search("col", vec![1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "c");
    }

    #[tokio::test]
    async fn search_with_filter() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(
                "col",
                vec![point("a", vec![1.0, 0.0], 1), point("b", vec![1.0, 0.0], 2)],
            )
            .await
            .unwrap();

        let hits = store
            .search(
                "col",
                vec![1.0, 0.0],
                10,
                Some(VectorFilter::field_eq("file_id", 2)),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[tokio::test]
    async fn delete_by_filter_removes_only_matches() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(
                "col",
                vec![
                    point("a", vec![1.0, 0.0], 1),
                    point("b", vec![1.0, 0.0], 1),
                    point("c", vec![1.0, 0.0], 2),
                ],
            )
            .await
            .unwrap();

        store
            .delete_by_filter("col", VectorFilter::field_eq("file_id", 1))
            .await
            .unwrap();

        assert_eq!(store.len("col"), 1);
        let rest = store
            .get_by_filter("col", VectorFilter::field_eq("file_id", 2))
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "c");
    }

    #[tokio::test]
    async fn delete_missing_collection_is_ok() {
        let store = InMemoryVectorStore::new();
        let result = store
            .delete_by_filter("nope", VectorFilter::field_eq("file_id", 1))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn search_missing_collection_is_empty() {
        let store = InMemoryVectorStore::new();
        let hits = store.search("nope", vec![1.0], 5, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn cosine_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
