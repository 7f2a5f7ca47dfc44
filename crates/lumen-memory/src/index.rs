//! In-memory vector index over embedded chunks.

use std::sync::OnceLock;

use lumen_llm::{EmbedFn, LlmError};

use crate::document::Chunk;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index has not been built")]
    NotBuilt,

    #[error("index has already been built")]
    AlreadyBuilt,

    #[error("k must be a positive integer")]
    InvalidK,

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),
}

/// A query hit with its cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Write-once vector index.
///
/// `build` embeds every chunk and publishes the result atomically; until it
/// returns successfully, `query` reports [`IndexError::NotBuilt`]. After that
/// the index is read-only and can be shared across tasks.
pub struct VectorIndex {
    embed: EmbedFn,
    entries: OnceLock<Vec<Entry>>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("built", &self.is_built())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    #[must_use]
    pub fn new(embed: EmbedFn) -> Self {
        Self {
            embed,
            entries: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Number of indexed chunks (zero before build).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.get().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed `chunks` and make them queryable.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::AlreadyBuilt`] on a second call, an embedding error
    /// if any chunk fails to embed, or [`IndexError::DimensionMismatch`] if the
    /// embedding function returns vectors of differing length. On error nothing
    /// is published.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<(), IndexError> {
        if self.is_built() {
            return Err(IndexError::AlreadyBuilt);
        }

        let mut entries = Vec::with_capacity(chunks.len());
        let mut dim: Option<usize> = None;
        for chunk in chunks {
            let vector = (self.embed)(&chunk.content).await?;
            match dim {
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(IndexError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
            }
            tracing::debug!(
                source = %chunk.source_id,
                chunk_index = chunk.chunk_index,
                "embedded chunk"
            );
            entries.push(Entry { chunk, vector });
        }

        let count = entries.len();
        self.entries
            .set(entries)
            .map_err(|_| IndexError::AlreadyBuilt)?;
        tracing::info!(chunks = count, dimension = dim.unwrap_or(0), "index built");
        Ok(())
    }

    /// Top `k` chunks for `text`, best match first.
    ///
    /// # Errors
    ///
    /// See [`VectorIndex::query_scored`].
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<Chunk>, IndexError> {
        Ok(self
            .query_scored(text, k)
            .await?
            .into_iter()
            .map(|s| s.chunk)
            .collect())
    }

    /// Top `min(k, len)` chunks with scores, ordered by descending cosine
    /// similarity; equal scores keep build order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotBuilt`] before `build`, [`IndexError::InvalidK`]
    /// for `k == 0`, or an embedding error for the query text.
    pub async fn query_scored(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        let entries = self.entries.get().ok_or(IndexError::NotBuilt)?;
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let query = (self.embed)(text).await?;
        let expected = entries[0].vector.len();
        if query.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(&query, &e.vector)))
            .collect();
        // stable: ties keep build order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: entries[i].chunk.clone(),
                score,
            })
            .collect())
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
