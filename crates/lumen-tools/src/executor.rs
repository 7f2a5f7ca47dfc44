use std::fmt;
use std::future::Future;
use std::pin::Pin;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::registry::ToolDef;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one tool invocation, ready to become an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_name: String,
    pub summary: String,
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid tool parameters: {message}")]
    InvalidParams { message: String },

    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] lumen_memory::IndexError),

    #[error("execution failed: {0}")]
    Execution(String),
}

/// A named capability the agent can invoke with a text input.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDef;

    fn invoke<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<ToolOutput, ToolError>>;
}

/// Parameters shared by the query-style tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// Free-text search query
    pub query: String,
}

/// Accept either a bare query string or a JSON object `{"query": "..."}`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidParams`] for malformed JSON or an empty query.
pub fn parse_query_input(input: &str) -> Result<String, ToolError> {
    let trimmed = input.trim();
    let query = if trimmed.starts_with('{') {
        serde_json::from_str::<QueryParams>(trimmed)
            .map_err(|e| ToolError::InvalidParams {
                message: e.to_string(),
            })?
            .query
    } else {
        trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed)
            .to_owned()
    };

    let query = query.trim();
    if query.is_empty() {
        return Err(ToolError::InvalidParams {
            message: "query must not be empty".into(),
        });
    }
    Ok(query.to_owned())
}

pub const MAX_TOOL_OUTPUT_CHARS: usize = 30_000;

/// Truncate tool output that exceeds `MAX_TOOL_OUTPUT_CHARS` using head+tail split.
#[must_use]
pub fn truncate_tool_output(output: &str) -> String {
    if output.len() <= MAX_TOOL_OUTPUT_CHARS {
        return output.to_string();
    }

    let half = MAX_TOOL_OUTPUT_CHARS / 2;
    let mut head_end = half;
    while !output.is_char_boundary(head_end) {
        head_end -= 1;
    }
    let mut tail_start = output.len() - half;
    while !output.is_char_boundary(tail_start) {
        tail_start += 1;
    }
    let head = &output[..head_end];
    let tail = &output[tail_start..];
    let truncated = tail_start - head_end;

    format!(
        "{head}\n\n... [truncated {truncated} chars, showing first and last ~{half} chars] ...\n\n{tail}"
    )
}
