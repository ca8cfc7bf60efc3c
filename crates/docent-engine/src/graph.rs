//! The answer graph: one decision node, two terminal branches.
//!
//! `start → routed → answered(documents) | answered(web-search)`. The router
//! runs exactly once; its decision selects exactly one branch; there are no
//! retries, loops, or cycles.

use std::sync::Arc;

use docent_index::{RetrievedSegment, Retriever};
use docent_llm::{LlmProvider, Message};

use crate::error::Result;
use crate::rag::DocsChain;
use crate::router::{RouteDecision, Router};
use crate::search::{SearchChain, WebSearch};

/// Terminal state of the graph. Both branches produce the same shape; only
/// the production path differs. `sources` carries retrieval provenance and
/// is empty on the web branch.
#[derive(Debug)]
pub struct QueryOutcome {
    pub answer: String,
    pub source: RouteDecision,
    pub sources: Vec<RetrievedSegment>,
}

pub struct QueryGraph<P: LlmProvider, W: WebSearch> {
    router: Router<P>,
    docs: DocsChain<P>,
    web: SearchChain<P, W>,
}

impl<P: LlmProvider, W: WebSearch> QueryGraph<P, W> {
    #[must_use]
    pub fn new(provider: Arc<P>, retriever: Retriever<P>, search: Arc<W>) -> Self {
        Self {
            router: Router::new(Arc::clone(&provider)),
            docs: DocsChain::new(Arc::clone(&provider), retriever),
            web: SearchChain::new(provider, search),
        }
    }

    /// Run one query through the graph.
    ///
    /// # Errors
    ///
    /// Any upstream failure (routing, reformulation, retrieval, search, or
    /// synthesis) aborts the query. There is no partial or degraded answer.
    pub async fn run(&self, question: &str, history: &[Message]) -> Result<QueryOutcome> {
        let decision = self.router.route(question).await?;

        match decision {
            RouteDecision::Documents => {
                let result = self.docs.answer(question, history).await?;
                Ok(QueryOutcome {
                    answer: result.answer,
                    source: decision,
                    sources: result.sources,
                })
            }
            RouteDecision::WebSearch => {
                let result = self.web.answer(question, history).await?;
                Ok(QueryOutcome {
                    answer: result.answer,
                    source: decision,
                    sources: Vec::new(),
                })
            }
        }
    }
}
