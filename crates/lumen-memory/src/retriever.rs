use std::future::Future;
use std::sync::Arc;

use crate::document::Chunk;
use crate::index::{IndexError, VectorIndex};

/// Query-time capability: question in, ranked chunks out.
pub trait Retriever: Send + Sync {
    /// # Errors
    ///
    /// Returns [`IndexError::NotBuilt`] if the backing index is not built yet,
    /// or an embedding error.
    fn retrieve(&self, question: &str)
    -> impl Future<Output = Result<Vec<Chunk>, IndexError>> + Send;
}

/// Fixed-`k` passthrough to a shared [`VectorIndex`].
#[derive(Debug, Clone)]
pub struct IndexRetriever {
    index: Arc<VectorIndex>,
    k: usize,
}

impl IndexRetriever {
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidK`] when `k` is zero.
    pub fn new(index: Arc<VectorIndex>, k: usize) -> Result<Self, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        Ok(Self { index, k })
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }
}

impl Retriever for IndexRetriever {
    async fn retrieve(&self, question: &str) -> Result<Vec<Chunk>, IndexError> {
        self.index.query(question, self.k).await
    }
}
