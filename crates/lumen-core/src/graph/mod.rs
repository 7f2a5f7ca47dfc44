//! The fixed two-node graph: `retrieve_docs -> generate_answer`.

pub mod nodes;
pub mod state;
pub mod step;

use std::sync::{Arc, OnceLock};

use lumen_llm::LlmError;
use lumen_memory::{IndexError, Retriever};

pub use nodes::{GenerateAnswer, RetrieveDocs};
pub use state::{Answer, GraphStage, RagState};
pub use step::{Step, Then};

use crate::generator::Generator;
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),

    #[error("generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("cannot run {step} from stage {from}")]
    InvalidTransition { from: GraphStage, step: &'static str },
}

type Compiled<R, G> = Then<RetrieveDocs<R>, GenerateAnswer<G>>;

/// Retrieve-then-generate graph over any [`Retriever`] and [`Generator`].
///
/// The node chain is assembled once, on the first `build` or `run`; both are
/// safe to call repeatedly and from concurrent tasks. Each `run` threads its
/// own [`RagState`], so in-flight questions never share state.
pub struct RagGraph<R, G> {
    retriever: Arc<R>,
    generator: Arc<G>,
    compiled: OnceLock<Compiled<R, G>>,
}

impl<R, G> std::fmt::Debug for RagGraph<R, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagGraph")
            .field("built", &self.is_built())
            .finish_non_exhaustive()
    }
}

impl<R, G> RagGraph<R, G> {
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.compiled.get().is_some()
    }
}

impl<R: Retriever, G: Generator> RagGraph<R, G> {
    #[must_use]
    pub fn new(retriever: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            retriever,
            generator,
            compiled: OnceLock::new(),
        }
    }

    /// Assemble the node chain. Idempotent.
    pub fn build(&self) {
        let _ = self.compiled();
    }

    fn compiled(&self) -> &Compiled<R, G> {
        self.compiled.get_or_init(|| {
            tracing::debug!("compiling rag graph");
            RetrieveDocs::new(Arc::clone(&self.retriever))
                .then(GenerateAnswer::new(Arc::clone(&self.generator)))
        })
    }

    /// Run both nodes for `question` and return the final state.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Retrieval`] if retrieval fails (for example an
    /// unbuilt index), or a generation error from the wired generator. On
    /// success the returned state always carries an answer.
    pub async fn run(&self, question: &str) -> Result<RagState, GraphError> {
        let state = self.compiled().run(RagState::new(question)).await?;
        if state.stage() != GraphStage::Answered {
            return Err(GraphError::InvalidTransition {
                from: state.stage(),
                step: "answer",
            });
        }
        Ok(state)
    }

    /// [`run`](Self::run), reduced to the caller-facing payload.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub async fn ask(&self, question: &str) -> Result<Answer, GraphError> {
        self.run(question).await?.into_answer()
    }
}
