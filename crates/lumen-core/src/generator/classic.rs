use std::fmt;
use std::sync::Arc;

use lumen_llm::{LlmProvider, Message};
use lumen_memory::Chunk;

use super::Generator;
use crate::graph::{GraphError, RagState};

/// Single-shot generation: one prompt built from the retrieved context, one
/// model call.
pub struct AnswerGenerator<P> {
    provider: Arc<P>,
}

impl<P> fmt::Debug for AnswerGenerator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerGenerator").finish_non_exhaustive()
    }
}

impl<P: LlmProvider> AnswerGenerator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

/// Chunk contents in retrieval order, separated by blank lines.
#[must_use]
pub fn build_context(docs: &[Chunk]) -> String {
    docs.iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[must_use]
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question only based on the context.\n\nContext:\n{context}\n\nQuestion: {question}"
    )
}

impl<P: LlmProvider> Generator for AnswerGenerator<P> {
    async fn generate(&self, state: RagState) -> Result<RagState, GraphError> {
        let context = build_context(state.documents()?);
        let prompt = build_prompt(state.question(), &context);

        let answer = self.provider.chat(&[Message::user(prompt)]).await?;
        if answer.trim().is_empty() {
            return Err(GraphError::Generation(format!(
                "{} returned an empty answer",
                self.provider.name()
            )));
        }

        tracing::debug!(chars = answer.len(), "answer generated");
        state.with_answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use lumen_llm::mock::MockProvider;
    use lumen_memory::DocumentMetadata;

    use super::*;
    use crate::graph::GraphStage;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            source_id: "s".into(),
            content: text.into(),
            metadata: DocumentMetadata::new("s", "text/plain"),
            chunk_index: 0,
            start: 0,
        }
    }

    fn retrieved(docs: Vec<Chunk>) -> RagState {
        RagState::new("What is the capital?")
            .with_retrieved(docs)
            .unwrap()
    }

    #[test]
    fn context_joins_in_order() {
        let ctx = build_context(&[chunk("first"), chunk("second")]);
        assert_eq!(ctx, "first\n\nsecond");
        assert_eq!(build_context(&[]), "");
    }

    #[tokio::test]
    async fn single_call_with_context_prompt() {
        let provider = Arc::new(MockProvider::with_responses(vec!["Paris".into()]));
        let generator = AnswerGenerator::new(Arc::clone(&provider));

        let state = generator
            .generate(retrieved(vec![chunk("Paris is the capital of France.")]))
            .await
            .unwrap();
        assert_eq!(state.stage(), GraphStage::Answered);
        assert_eq!(state.answer(), Some("Paris"));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let prompt = &calls[0][0].content;
        assert!(prompt.starts_with("Answer the question only based on the context."));
        assert!(prompt.contains("Context:\nParis is the capital of France."));
        assert!(prompt.ends_with("Question: What is the capital?"));
    }

    #[tokio::test]
    async fn empty_answer_is_generation_error() {
        let provider = Arc::new(MockProvider::with_responses(vec!["  \n".into()]));
        let err = AnswerGenerator::new(provider)
            .generate(retrieved(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Generation(_)));
    }

    #[tokio::test]
    async fn model_failure_propagates() {
        let err = AnswerGenerator::new(Arc::new(MockProvider::failing()))
            .generate(retrieved(vec![chunk("x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Llm(_)));
    }

    #[tokio::test]
    async fn refuses_state_without_documents() {
        let provider = Arc::new(MockProvider::default());
        let err = AnswerGenerator::new(Arc::clone(&provider))
            .generate(RagState::new("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidTransition { .. }));
        assert!(provider.calls().is_empty());
    }
}
