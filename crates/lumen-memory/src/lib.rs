//! Document ingestion and in-memory vector retrieval.

pub mod document;
pub mod index;
pub mod retriever;

pub use document::{
    Chunk, Document, DocumentError, DocumentMetadata, MetadataValue, SourceLoader,
    SplitterConfig, TextSplitter,
};
pub use index::{IndexError, ScoredChunk, VectorIndex};
pub use retriever::{IndexRetriever, Retriever};
