use std::fmt;

use lumen_memory::Chunk;

use super::GraphError;

/// Position of a [`RagState`] in the `Start -> Retrieved -> Answered` machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStage {
    Start,
    Retrieved,
    Answered,
}

impl fmt::Display for GraphStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Retrieved => "retrieved",
            Self::Answered => "answered",
        })
    }
}

/// The record threaded through the graph.
///
/// Fields are private: the question is fixed at construction, and the
/// retrieved documents and answer can each be set exactly once, in that
/// order, through the consuming `with_*` transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct RagState {
    question: String,
    retrieved_docs: Option<Vec<Chunk>>,
    answer: Option<String>,
}

impl RagState {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            retrieved_docs: None,
            answer: None,
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn retrieved_docs(&self) -> Option<&[Chunk]> {
        self.retrieved_docs.as_deref()
    }

    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    #[must_use]
    pub fn stage(&self) -> GraphStage {
        match (&self.retrieved_docs, &self.answer) {
            (None, _) => GraphStage::Start,
            (Some(_), None) => GraphStage::Retrieved,
            (Some(_), Some(_)) => GraphStage::Answered,
        }
    }

    /// Documents a generator answers from.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTransition`] unless retrieval has run and
    /// no answer is set yet.
    pub fn documents(&self) -> Result<&[Chunk], GraphError> {
        match (&self.retrieved_docs, &self.answer) {
            (Some(docs), None) => Ok(docs),
            _ => Err(GraphError::InvalidTransition {
                from: self.stage(),
                step: "generate_answer",
            }),
        }
    }

    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTransition`] unless the state is at
    /// [`GraphStage::Start`].
    pub fn with_retrieved(self, docs: Vec<Chunk>) -> Result<Self, GraphError> {
        if self.stage() != GraphStage::Start {
            return Err(GraphError::InvalidTransition {
                from: self.stage(),
                step: "retrieve_docs",
            });
        }
        Ok(Self {
            retrieved_docs: Some(docs),
            ..self
        })
    }

    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTransition`] unless the state is at
    /// [`GraphStage::Retrieved`].
    pub fn with_answer(self, answer: impl Into<String>) -> Result<Self, GraphError> {
        if self.stage() != GraphStage::Retrieved {
            return Err(GraphError::InvalidTransition {
                from: self.stage(),
                step: "generate_answer",
            });
        }
        Ok(Self {
            answer: Some(answer.into()),
            ..self
        })
    }

    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTransition`] if no answer has been set.
    pub fn into_answer(self) -> Result<Answer, GraphError> {
        match (self.retrieved_docs, self.answer) {
            (Some(retrieved_docs), Some(answer)) => Ok(Answer {
                answer,
                retrieved_docs,
            }),
            (docs, _) => Err(GraphError::InvalidTransition {
                from: if docs.is_some() {
                    GraphStage::Retrieved
                } else {
                    GraphStage::Start
                },
                step: "answer",
            }),
        }
    }
}

/// What a caller gets back for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub answer: String,
    pub retrieved_docs: Vec<Chunk>,
}

#[cfg(test)]
mod tests {
    use lumen_memory::DocumentMetadata;

    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            source_id: "doc".into(),
            content: text.into(),
            metadata: DocumentMetadata::new("doc", "text/plain"),
            chunk_index: 0,
            start: 0,
        }
    }

    #[test]
    fn transitions_in_order() {
        let state = RagState::new("q");
        assert_eq!(state.stage(), GraphStage::Start);
        assert!(state.retrieved_docs().is_none());

        let state = state.with_retrieved(vec![chunk("a")]).unwrap();
        assert_eq!(state.stage(), GraphStage::Retrieved);
        assert_eq!(state.documents().unwrap().len(), 1);
        assert!(state.answer().is_none());

        let state = state.with_answer("done").unwrap();
        assert_eq!(state.stage(), GraphStage::Answered);
        assert_eq!(state.question(), "q");

        let answer = state.into_answer().unwrap();
        assert_eq!(answer.answer, "done");
        assert_eq!(answer.retrieved_docs[0].content, "a");
    }

    #[test]
    fn empty_retrieval_is_still_retrieved() {
        let state = RagState::new("q").with_retrieved(Vec::new()).unwrap();
        assert_eq!(state.stage(), GraphStage::Retrieved);
        assert!(state.documents().unwrap().is_empty());
    }

    #[test]
    fn answer_before_retrieval_is_rejected() {
        let err = RagState::new("q").with_answer("x").unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidTransition {
                from: GraphStage::Start,
                step: "generate_answer"
            }
        ));
        assert!(RagState::new("q").documents().is_err());
    }

    #[test]
    fn fields_are_set_once() {
        let state = RagState::new("q").with_retrieved(vec![]).unwrap();
        assert!(state.clone().with_retrieved(vec![chunk("b")]).is_err());

        let state = state.with_answer("first").unwrap();
        assert!(state.clone().with_answer("second").is_err());
        assert!(state.documents().is_err());
        assert_eq!(state.answer(), Some("first"));
    }

    #[test]
    fn into_answer_requires_answer() {
        let state = RagState::new("q").with_retrieved(vec![]).unwrap();
        assert!(matches!(
            state.into_answer(),
            Err(GraphError::InvalidTransition {
                from: GraphStage::Retrieved,
                ..
            })
        ));
    }

    #[test]
    fn stage_display() {
        assert_eq!(GraphStage::Retrieved.to_string(), "retrieved");
    }
}
