use std::sync::Arc;

use lumen_memory::{Chunk, Retriever};

use crate::executor::{BoxFuture, QueryParams, Tool, ToolError, ToolOutput, parse_query_input};
use crate::registry::ToolDef;

pub const NO_DOCUMENTS: &str = "No documents found.";
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Exposes a [`Retriever`] to the agent as the `retriever` tool.
#[derive(Debug)]
pub struct RetrieverTool<R> {
    retriever: Arc<R>,
    max_results: usize,
}

impl<R> Clone for RetrieverTool<R> {
    fn clone(&self) -> Self {
        Self {
            retriever: Arc::clone(&self.retriever),
            max_results: self.max_results,
        }
    }
}

impl<R: Retriever> RetrieverTool<R> {
    #[must_use]
    pub fn new(retriever: Arc<R>) -> Self {
        Self {
            retriever,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    async fn run(&self, input: &str) -> Result<ToolOutput, ToolError> {
        let query = parse_query_input(input)?;
        let chunks = self.retriever.retrieve(&query).await?;
        tracing::debug!(query = %query, hits = chunks.len(), "retriever tool");
        Ok(ToolOutput {
            tool_name: "retriever".into(),
            summary: format_passages(&chunks, self.max_results),
        })
    }
}

impl<R: Retriever> Tool for RetrieverTool<R> {
    fn definition(&self) -> ToolDef {
        ToolDef {
            id: "retriever",
            description: "Fetch passages from the indexed corpus of user-provided documents.",
            schema: schemars::schema_for!(QueryParams),
        }
    }

    fn invoke<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(self.run(input))
    }
}

/// Numbered, titled list of up to `max` passages, or [`NO_DOCUMENTS`].
#[must_use]
pub fn format_passages(chunks: &[Chunk], max: usize) -> String {
    if chunks.is_empty() {
        return NO_DOCUMENTS.to_owned();
    }
    chunks
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, c)| {
            let n = i + 1;
            match c.label() {
                Some(title) => format!("[{n}] {title}\n{}", c.content),
                None => format!("[{n}] doc_{n}\n{}", c.content),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
