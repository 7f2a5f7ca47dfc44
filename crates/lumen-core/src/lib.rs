//! Configuration, the retrieve-then-generate graph, and the generators that
//! terminate it.

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod generator;
pub mod graph;

pub use config::Config;
pub use generator::{AnswerGenerator, AnyGenerator, Generator, ReactGenerator};
pub use graph::{Answer, GraphError, GraphStage, RagGraph, RagState};
