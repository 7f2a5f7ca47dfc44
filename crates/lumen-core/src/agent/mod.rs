//! Pieces of the ReAct loop: the reasoning trace and the parser for each
//! model turn.

pub mod parser;
pub mod transcript;

pub use parser::{AgentStep, parse_step};
pub use transcript::{EntryRole, Transcript, TranscriptEntry};
