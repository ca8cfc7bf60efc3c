//! Branch-exclusivity and end-to-end scenarios for the answer graph.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use docent_engine::graph::QueryGraph;
use docent_engine::router::RouteDecision;
use docent_engine::search::{SEARCH_RESULT_COUNT, SearchError, SearchHit, WebSearch};
use docent_engine::types::{QueryRequest, QueryResponse};
use docent_index::Retriever;
use docent_index::in_memory::InMemoryVectorStore;
use docent_index::vector_store::{VectorPoint, VectorStore};
use docent_llm::mock::MockProvider;
use serde_json::json;

const COLLECTION: &str = "docent_segments";

const ROUTE_DOCS: &str = r#"{"destination": "documents"}"#;
const ROUTE_WEB: &str = r#"{"destination": "web-search"}"#;

struct RecordingSearch {
    calls: Mutex<Vec<(String, usize)>>,
}

impl RecordingSearch {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl WebSearch for RecordingSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.lock().unwrap().push((query.to_owned(), limit));
        Ok(vec![SearchHit {
            title: "result".into(),
            snippet: "a relevant snippet".into(),
            url: "https://example.com/result".into(),
        }])
    }
}

async fn seed_segment(store: &InMemoryVectorStore, file_id: i64, content: &str) {
    store
        .upsert(
            COLLECTION,
            vec![VectorPoint {
                id: uuid_like(file_id),
                vector: vec![0.1; 8],
                payload: HashMap::from([
                    ("file_id".to_owned(), json!(file_id)),
                    ("source".to_owned(), json!("paper.pdf")),
                    ("chunk_index".to_owned(), json!(0)),
                    ("content".to_owned(), json!(content)),
                ]),
            }],
        )
        .await
        .unwrap();
}

fn uuid_like(n: i64) -> String {
    format!("00000000-0000-0000-0000-{n:012}")
}

fn graph(
    provider: &Arc<MockProvider>,
    store: Arc<InMemoryVectorStore>,
    search: &Arc<RecordingSearch>,
) -> QueryGraph<MockProvider, RecordingSearch> {
    let retriever = Retriever::new(Arc::clone(provider), store, COLLECTION);
    QueryGraph::new(Arc::clone(provider), retriever, Arc::clone(search))
}

#[tokio::test]
async fn documents_branch_never_touches_search() {
    let store = Arc::new(InMemoryVectorStore::new());
    seed_segment(&store, 1, "The encoder stacks six identical layers.").await;

    let provider = Arc::new(MockProvider::with_responses(vec![
        ROUTE_DOCS.into(),
        "Six identical layers.".into(),
    ]));
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, store, &search);

    let outcome = graph
        .run("How many layers does the encoder stack?", &[])
        .await
        .unwrap();

    assert_eq!(outcome.source, RouteDecision::Documents);
    assert_eq!(outcome.answer, "Six identical layers.");
    // Route + synthesis; the search branch's collaborators were never called.
    assert_eq!(provider.chat_count(), 2);
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn web_branch_never_touches_retrieval() {
    let store = Arc::new(InMemoryVectorStore::new());
    let provider = Arc::new(MockProvider::with_responses(vec![
        ROUTE_WEB.into(),
        "rust 2024 edition changes".into(),
        "The 2024 edition changes capture rules.".into(),
    ]));
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, Arc::clone(&store), &search);

    let outcome = graph
        .run("What changed in the Rust 2024 edition?", &[])
        .await
        .unwrap();

    assert_eq!(outcome.source, RouteDecision::WebSearch);
    assert!(outcome.sources.is_empty());
    // Retrieval never ran: no embedding calls.
    assert_eq!(provider.embed_count(), 0);

    // The formulator ran once and its query reached the search API once.
    let calls = search.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        ("rust 2024 edition changes".to_owned(), SEARCH_RESULT_COUNT)
    );
}

#[tokio::test]
async fn documents_scenario_end_to_end() {
    let store = Arc::new(InMemoryVectorStore::new());
    seed_segment(&store, 1, "Dropout of 0.1 is applied to sublayer outputs.").await;

    let provider = Arc::new(MockProvider::with_responses(vec![
        ROUTE_DOCS.into(),
        "A dropout rate of 0.1.".into(),
    ]));
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, store, &search);

    let request = QueryRequest {
        question: "What dropout rate does the paper use?".into(),
        session_id: None,
        model: None,
    };
    let outcome = graph.run(&request.question, &[]).await.unwrap();
    let response = QueryResponse::new(&request, outcome.answer, outcome.source);

    assert_eq!(
        serde_json::to_value(&response).unwrap()["source"],
        "documents"
    );
    assert!(!response.answer.is_empty());
    assert!(!outcome.sources.is_empty());
    assert_eq!(outcome.sources[0].file_id, Some(1));
}

#[tokio::test]
async fn web_scenario_end_to_end_with_empty_index() {
    let store = Arc::new(InMemoryVectorStore::new());
    let provider = Arc::new(MockProvider::with_responses(vec![
        ROUTE_WEB.into(),
        "current qdrant release".into(),
        "The latest release is documented on the project site.".into(),
    ]));
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, store, &search);

    let request = QueryRequest {
        question: "What is the current qdrant release?".into(),
        session_id: Some("session-7".into()),
        model: None,
    };
    let outcome = graph.run(&request.question, &[]).await.unwrap();
    let response = QueryResponse::new(&request, outcome.answer, outcome.source);

    assert_eq!(response.session_id, "session-7");
    assert_eq!(
        serde_json::to_value(&response).unwrap()["source"],
        "web-search"
    );
    assert_eq!(search.calls().len(), 1);
}

#[tokio::test]
async fn router_failure_aborts_whole_query() {
    let store = Arc::new(InMemoryVectorStore::new());
    let provider = Arc::new(MockProvider::failing());
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, store, &search);

    assert!(graph.run("anything", &[]).await.is_err());
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn synthesis_failure_aborts_documents_branch() {
    let store = Arc::new(InMemoryVectorStore::new());
    seed_segment(&store, 1, "some content").await;

    // Route succeeds; the retrieval embedding then fails.
    let mut provider = MockProvider::with_responses(vec![ROUTE_DOCS.into()]);
    provider.fail_embed = true;
    let provider = Arc::new(provider);
    let search = Arc::new(RecordingSearch::new());
    let graph = graph(&provider, store, &search);

    assert!(graph.run("anything", &[]).await.is_err());
}
