//! Documents branch: reformulate, retrieve, synthesize.

use std::fmt::Write as _;
use std::sync::Arc;

use docent_index::{RetrievedSegment, Retriever};
use docent_llm::{LlmProvider, Message};

use crate::error::Result;
use crate::prompts::QA_SYSTEM;
use crate::reformulate::Reformulator;

/// An answer grounded in retrieved segments. The segments that backed the
/// answer ride along so callers can surface provenance.
#[derive(Debug)]
pub struct DocsAnswer {
    pub answer: String,
    pub sources: Vec<RetrievedSegment>,
}

pub struct DocsChain<P: LlmProvider> {
    provider: Arc<P>,
    reformulator: Reformulator<P>,
    retriever: Retriever<P>,
}

impl<P: LlmProvider> DocsChain<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, retriever: Retriever<P>) -> Self {
        Self {
            reformulator: Reformulator::new(Arc::clone(&provider)),
            provider,
            retriever,
        }
    }

    /// Answer `question` from the indexed documents.
    ///
    /// Retrieval uses the reformulated question; synthesis sees the original
    /// question, the conversation history, and the retrieved context.
    ///
    /// # Errors
    ///
    /// Returns an error if reformulation, retrieval, or synthesis fails.
    pub async fn answer(&self, question: &str, history: &[Message]) -> Result<DocsAnswer> {
        let standalone = self.reformulator.reformulate(question, history).await?;
        let sources = self.retriever.retrieve(&standalone).await?;

        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(Message::system(QA_SYSTEM));
        messages.push(Message::system(format_context(&sources)));
        messages.extend_from_slice(history);
        messages.push(Message::user(question));

        let answer = self.provider.chat(&messages).await?;
        Ok(DocsAnswer { answer, sources })
    }
}

fn format_context(sources: &[RetrievedSegment]) -> String {
    let mut context = String::from("Context:");
    if sources.is_empty() {
        context.push_str(" (no matching documents)");
        return context;
    }
    for segment in sources {
        let _ = write!(context, "\n\n[{}]\n{}", segment.source, segment.content);
    }
    context
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use docent_index::in_memory::InMemoryVectorStore;
    use docent_index::vector_store::{VectorPoint, VectorStore};
    use docent_llm::mock::MockProvider;
    use serde_json::json;

    const COLLECTION: &str = "docent_segments";

    async fn store_with_segment(content: &str) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert(
                COLLECTION,
                vec![VectorPoint {
                    id: "p0".into(),
                    vector: vec![0.1; 8],
                    payload: HashMap::from([
                        ("file_id".to_owned(), json!(1)),
                        ("source".to_owned(), json!("paper.pdf")),
                        ("chunk_index".to_owned(), json!(0)),
                        ("content".to_owned(), json!(content)),
                    ]),
                }],
            )
            .await
            .unwrap();
        store
    }

    fn chain(provider: &Arc<MockProvider>, store: Arc<InMemoryVectorStore>) -> DocsChain<MockProvider> {
        let retriever = Retriever::new(Arc::clone(provider), store, COLLECTION);
        DocsChain::new(Arc::clone(provider), retriever)
    }

    #[tokio::test]
    async fn answer_carries_provenance() {
        let store = store_with_segment("Attention weights token pairs.").await;
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Attention weights pairs of tokens.".into(),
        ]));
        let docs = chain(&provider, store);

        let result = docs.answer("What does attention do?", &[]).await.unwrap();
        assert_eq!(result.answer, "Attention weights pairs of tokens.");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].source, "paper.pdf");
        // No history: one synthesis call only.
        assert_eq!(provider.chat_count(), 1);
        assert_eq!(provider.embed_count(), 1);
    }

    #[tokio::test]
    async fn history_adds_reformulation_call() {
        let store = store_with_segment("Positional encodings add order.").await;
        let provider = Arc::new(MockProvider::with_responses(vec![
            "What are positional encodings in the transformer?".into(),
            "They inject token order.".into(),
        ]));
        let docs = chain(&provider, store);

        let history = vec![
            Message::user("Explain the transformer."),
            Message::assistant("It is an attention-based model."),
        ];
        let result = docs.answer("and the encodings?", &history).await.unwrap();
        assert_eq!(result.answer, "They inject token order.");
        assert_eq!(provider.chat_count(), 2);
    }

    #[tokio::test]
    async fn empty_store_still_answers() {
        let store = Arc::new(InMemoryVectorStore::new());
        let provider = Arc::new(MockProvider::with_responses(vec![
            "I have no indexed material on that.".into(),
        ]));
        let docs = chain(&provider, store);

        let result = docs.answer("Anything?", &[]).await.unwrap();
        assert!(result.sources.is_empty());
        assert!(!result.answer.is_empty());
    }

    #[test]
    fn context_formatting() {
        let segments = vec![RetrievedSegment {
            content: "Body text.".into(),
            source: "a.html".into(),
            file_id: Some(1),
            score: 0.9,
        }];
        let context = format_context(&segments);
        assert!(context.starts_with("Context:"));
        assert!(context.contains("[a.html]"));
        assert!(context.contains("Body text."));
    }
}
