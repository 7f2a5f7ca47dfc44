//! Tools the agentic generator can call: corpus retrieval and Wikipedia lookup.

pub mod executor;
pub mod registry;
pub mod retriever;
pub mod wikipedia;

pub use executor::{
    BoxFuture, MAX_TOOL_OUTPUT_CHARS, QueryParams, Tool, ToolError, ToolOutput,
    parse_query_input, truncate_tool_output,
};
pub use registry::{ToolDef, ToolRegistry};
pub use retriever::RetrieverTool;
pub use wikipedia::WikipediaTool;
