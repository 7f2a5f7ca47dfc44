use std::sync::Arc;

use lumen_memory::Retriever;
use tracing::Instrument;

use super::step::Step;
use super::{GraphError, GraphStage, RagState};
use crate::generator::Generator;

/// Entry node: populates `retrieved_docs`.
pub struct RetrieveDocs<R> {
    retriever: Arc<R>,
}

impl<R> RetrieveDocs<R> {
    #[must_use]
    pub fn new(retriever: Arc<R>) -> Self {
        Self { retriever }
    }
}

impl<R: Retriever> Step for RetrieveDocs<R> {
    type Input = RagState;
    type Output = RagState;

    async fn run(&self, state: RagState) -> Result<RagState, GraphError> {
        let span = tracing::info_span!("retrieve_docs", question = %state.question());
        async move {
            let docs = self.retriever.retrieve(state.question()).await?;
            tracing::debug!(hits = docs.len(), "retrieved documents");
            state.with_retrieved(docs)
        }
        .instrument(span)
        .await
    }
}

/// Terminal node: hands a retrieved state to the wired [`Generator`].
pub struct GenerateAnswer<G> {
    generator: Arc<G>,
}

impl<G> GenerateAnswer<G> {
    #[must_use]
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }
}

impl<G: Generator> Step for GenerateAnswer<G> {
    type Input = RagState;
    type Output = RagState;

    async fn run(&self, state: RagState) -> Result<RagState, GraphError> {
        if state.stage() != GraphStage::Retrieved {
            return Err(GraphError::InvalidTransition {
                from: state.stage(),
                step: "generate_answer",
            });
        }
        let span = tracing::info_span!("generate_answer");
        self.generator.generate(state).instrument(span).await
    }
}
