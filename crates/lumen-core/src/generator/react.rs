use std::fmt;
use std::sync::Arc;

use lumen_llm::LlmProvider;
use lumen_tools::{ToolRegistry, truncate_tool_output};
use tracing::Instrument;

use super::Generator;
use crate::agent::{AgentStep, Transcript, parse_step};
use crate::graph::{GraphError, RagState};

/// Answer used when the loop ends without a usable final answer.
pub const AGENT_FALLBACK: &str = "Could not generate answer.";

pub const DEFAULT_MAX_ITERATIONS: usize = 6;

const AGENT_INSTRUCTIONS: &str = "You are a helpful RAG agent. Prefer 'retriever' for \
user-provided docs; use 'wikipedia' for general knowledge. Return only the final useful answer.";

/// Tool-using generator running a bounded Thought/Action/Observation loop.
pub struct ReactGenerator<P> {
    provider: Arc<P>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl<P> fmt::Debug for ReactGenerator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactGenerator")
            .field("tools", &self.tools.names())
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> ReactGenerator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Cap on model turns per question. Zero is raised to one.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    #[must_use]
    pub fn system_prompt(&self) -> String {
        let names = self.tools.names().join(", ");
        format!(
            "{AGENT_INSTRUCTIONS}\n\n\
             You can use these tools:\n{tools}\n\n\
             Use this format:\n\n\
             Question: the question you must answer\n\
             Thought: what to do next\n\
             Action: the tool to use, one of [{names}]\n\
             Action Input: the query for the tool\n\
             Observation: the tool result\n\
             ... (Thought/Action/Action Input/Observation can repeat)\n\
             Thought: I now know the final answer\n\
             Final Answer: the answer to the question\n\n\
             Stop after Action Input and wait for the Observation.",
            tools = self.tools.format_for_prompt(),
        )
    }

    async fn run_loop(&self, question: &str) -> Result<Option<String>, GraphError> {
        let system = self.system_prompt();
        let mut transcript = Transcript::new(question);

        for iteration in 0..self.max_iterations {
            let span = tracing::info_span!("agent_step", iteration);
            let response = self
                .provider
                .chat(&transcript.to_messages(&system))
                .instrument(span.clone())
                .await?;
            transcript.push_agent(response);

            let Some(last) = transcript.last() else {
                break;
            };
            match parse_step(&last.content) {
                AgentStep::Final { answer } => {
                    return Ok(Some(answer).filter(|a| !a.trim().is_empty()));
                }
                AgentStep::Action { tool, input } => {
                    if iteration + 1 == self.max_iterations {
                        tracing::debug!(tool = %tool, "no turn left to read an observation, skipping tool");
                        break;
                    }
                    let observation = match self
                        .tools
                        .invoke(&tool, &input)
                        .instrument(span)
                        .await
                    {
                        Ok(output) => output.summary,
                        Err(e) => {
                            tracing::debug!(iteration, tool = %tool, "tool failed: {e}");
                            format!("Tool error: {e}")
                        }
                    };
                    transcript.push_tool(tool, truncate_tool_output(&observation));
                }
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "agent loop exhausted without a final answer"
        );
        Ok(None)
    }
}

impl<P: LlmProvider> Generator for ReactGenerator<P> {
    async fn generate(&self, state: RagState) -> Result<RagState, GraphError> {
        state.documents()?;

        if let Some(answer) = self.run_loop(state.question()).await? {
            tracing::debug!(chars = answer.len(), "agent produced final answer");
            return state.with_answer(answer);
        }

        tracing::warn!("agent returned fallback answer");
        state.with_answer(AGENT_FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lumen_llm::mock::MockProvider;
    use lumen_tools::{BoxFuture, QueryParams, Tool, ToolDef, ToolError, ToolOutput};

    use super::*;

    struct Lookup;

    impl Tool for Lookup {
        fn definition(&self) -> ToolDef {
            ToolDef {
                id: "retriever",
                description: "Fixed passages.",
                schema: schemars::schema_for!(QueryParams),
            }
        }

        fn invoke<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
            Box::pin(async move {
                Ok(ToolOutput {
                    tool_name: "retriever".into(),
                    summary: format!("passages about {input}"),
                })
            })
        }
    }

    /// Counts invocations.
    struct Tally(Arc<AtomicUsize>);

    impl Tool for Tally {
        fn definition(&self) -> ToolDef {
            ToolDef {
                id: "retriever",
                description: "Counts lookups.",
                schema: schemars::schema_for!(QueryParams),
            }
        }

        fn invoke<'a>(&'a self, _input: &'a str) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Ok(ToolOutput {
                    tool_name: "retriever".into(),
                    summary: "nothing".into(),
                })
            })
        }
    }

    fn generator(responses: &[&str]) -> (Arc<MockProvider>, ReactGenerator<MockProvider>) {
        let provider = Arc::new(MockProvider::with_responses(
            responses.iter().map(|s| (*s).to_owned()).collect(),
        ));
        let tools = Arc::new(ToolRegistry::new().with_tool(Lookup));
        let generator = ReactGenerator::new(Arc::clone(&provider), tools).with_max_iterations(3);
        (provider, generator)
    }

    fn retrieved() -> RagState {
        RagState::new("What is an agent loop?")
            .with_retrieved(Vec::new())
            .unwrap()
    }

    #[test]
    fn system_prompt_lists_tools() {
        let (_, g) = generator(&[]);
        let prompt = g.system_prompt();
        assert!(prompt.starts_with("You are a helpful RAG agent."));
        assert!(prompt.contains("## retriever"));
        assert!(prompt.contains("one of [retriever]"));
        assert!(prompt.contains("Final Answer:"));
    }

    #[tokio::test]
    async fn direct_final_answer() {
        let (provider, g) = generator(&["Thought: easy\nFinal Answer: A loop of steps."]);
        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some("A loop of steps."));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn action_then_final() {
        let (provider, g) = generator(&[
            "Thought: search\nAction: retriever\nAction Input: agent loop",
            "Final Answer: plan, act, observe",
        ]);
        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some("plan, act, observe"));

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        let second = calls[1].last().unwrap();
        assert_eq!(second.content, "Observation: passages about agent loop");
    }

    #[tokio::test]
    async fn unknown_tool_becomes_observation() {
        let (provider, g) = generator(&[
            "Action: calculator\nAction Input: 2+2",
            "Final Answer: four",
        ]);
        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some("four"));
        let calls = provider.calls();
        assert!(
            calls[1]
                .last()
                .unwrap()
                .content
                .contains("Tool error: unknown tool: calculator")
        );
    }

    #[tokio::test]
    async fn exhaustion_returns_fallback() {
        let mut provider = MockProvider::default();
        provider.default_response = "Action: retriever\nAction Input: again".into();
        let provider = Arc::new(provider);
        let tools = Arc::new(ToolRegistry::new().with_tool(Lookup));
        let g = ReactGenerator::new(Arc::clone(&provider), tools).with_max_iterations(2);

        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some(AGENT_FALLBACK));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn action_on_last_iteration_skips_the_tool() {
        let mut provider = MockProvider::default();
        provider.default_response = "Action: retriever\nAction Input: again".into();
        let provider = Arc::new(provider);
        let invocations = Arc::new(AtomicUsize::new(0));
        let tools = Arc::new(ToolRegistry::new().with_tool(Tally(Arc::clone(&invocations))));
        let g = ReactGenerator::new(Arc::clone(&provider), tools).with_max_iterations(3);

        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some(AGENT_FALLBACK));
        assert_eq!(provider.calls().len(), 3);
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_final_answer_returns_fallback() {
        let (_, g) = generator(&["Final Answer:   "]);
        let state = g.generate(retrieved()).await.unwrap();
        assert_eq!(state.answer(), Some(AGENT_FALLBACK));
    }

    #[tokio::test]
    async fn model_error_propagates() {
        let tools = Arc::new(ToolRegistry::new().with_tool(Lookup));
        let g = ReactGenerator::new(Arc::new(MockProvider::failing()), tools);
        let err = g.generate(retrieved()).await.unwrap_err();
        assert!(matches!(err, GraphError::Llm(_)));
    }

    #[test]
    fn zero_iterations_raised_to_one() {
        let (_, g) = generator(&[]);
        assert_eq!(g.with_max_iterations(0).max_iterations(), 1);
    }
}
