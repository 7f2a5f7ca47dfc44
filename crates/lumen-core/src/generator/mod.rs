//! Terminal nodes of the graph. Both variants implement [`Generator`], so
//! [`RagGraph`](crate::graph::RagGraph) does not care which one is wired in.

pub mod classic;
pub mod react;

use std::future::Future;

use lumen_llm::LlmProvider;

pub use classic::AnswerGenerator;
pub use react::{AGENT_FALLBACK, ReactGenerator};

use crate::graph::{GraphError, RagState};

pub trait Generator: Send + Sync {
    /// Take a state whose documents have been retrieved and return it with
    /// the answer set.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if no answer could be produced. The agentic
    /// variant only fails on model errors; it answers with
    /// [`AGENT_FALLBACK`] when its loop ends without an answer.
    fn generate(&self, state: RagState)
    -> impl Future<Output = Result<RagState, GraphError>> + Send;
}

/// Either generator, chosen at startup.
#[derive(Debug)]
pub enum AnyGenerator<P> {
    Classic(AnswerGenerator<P>),
    Agentic(ReactGenerator<P>),
}

impl<P: LlmProvider> AnyGenerator<P> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classic(_) => "classic",
            Self::Agentic(_) => "agentic",
        }
    }
}

impl<P: LlmProvider> Generator for AnyGenerator<P> {
    async fn generate(&self, state: RagState) -> Result<RagState, GraphError> {
        match self {
            Self::Classic(g) => g.generate(state).await,
            Self::Agentic(g) => g.generate(state).await,
        }
    }
}
