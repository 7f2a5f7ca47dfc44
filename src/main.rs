use std::io::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use lumen_core::bootstrap::{self, AppGraph};
use lumen_core::{Answer, Config};
use tokio::io::{AsyncBufReadExt, BufReader};

const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What is the concept of agent loop in autonomous agents?",
    "What are the key components of LLM-powered agents?",
    "Explain the concept of diffusion models for video generation.",
];

const SNIPPET_CHARS: usize = 300;

/// Ask questions about web pages, PDF directories and text files.
#[derive(Debug, Parser)]
#[command(name = "lumen", version)]
struct Cli {
    /// Sources to index: http(s) URLs, directories of PDFs, or .txt files
    sources: Vec<String>,

    /// Config file (default: `LUMEN_CONFIG`, then config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File listing one source per line, used when no sources are given
    #[arg(long)]
    sources_file: Option<PathBuf>,

    /// Question to answer before the interactive prompt; repeatable
    #[arg(long, short)]
    question: Vec<String>,

    /// Answer with the tool-using agent instead of a single prompt
    #[arg(long)]
    agentic: bool,

    /// Run the built-in example questions first
    #[arg(long)]
    examples: bool,

    /// Exit after the one-shot questions
    #[arg(long)]
    no_interactive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let config_path = bootstrap::resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    if cli.agentic {
        config.agent.enabled = true;
    }

    let provider = bootstrap::create_provider(&config)?;
    bootstrap::health_check(&provider).await;

    let sources = bootstrap::resolve_sources(&cli.sources, cli.sources_file.as_deref(), &config)?;
    tracing::info!(sources = sources.len(), "building index");
    let started = Instant::now();
    let index = bootstrap::build_index(&config, &provider, &sources).await?;
    println!(
        "Indexed {} chunks from {} sources in {:.1}s",
        index.len(),
        sources.len(),
        started.elapsed().as_secs_f64()
    );

    let graph = bootstrap::build_graph(&config, provider, index)?;

    let mut questions = cli.question.clone();
    if cli.examples {
        questions.extend(EXAMPLE_QUESTIONS.iter().map(|q| (*q).to_owned()));
    }
    for question in &questions {
        answer_question(&graph, question).await;
    }

    if !cli.no_interactive {
        interactive(&graph).await?;
    }
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn answer_question(graph: &AppGraph, question: &str) {
    println!("\nQuestion: {question}");
    let started = Instant::now();
    match graph.ask(question).await {
        Ok(answer) => print!("{}", render_answer(&answer, started.elapsed())),
        Err(e) => {
            tracing::error!("failed to answer question: {e}");
            println!("Error: {e}");
        }
    }
}

async fn interactive(graph: &AppGraph) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nAsk a question (quit/exit/q to stop): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit(question) {
            break;
        }
        answer_question(graph, question).await;
    }
    Ok(())
}

fn is_exit(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "quit" | "exit" | "q"
    )
}

fn render_answer(answer: &Answer, elapsed: Duration) -> String {
    let mut out = format!(
        "\nAnswer: {}\n(answered in {:.2}s)\n",
        answer.answer.trim(),
        elapsed.as_secs_f64()
    );
    if answer.retrieved_docs.is_empty() {
        return out;
    }
    out.push_str("\nSources:\n");
    for (i, chunk) in answer.retrieved_docs.iter().enumerate() {
        let label = chunk.label().unwrap_or("unknown source");
        let snippet = chunk.snippet(SNIPPET_CHARS);
        let ellipsis = if snippet.len() < chunk.content.len() {
            "..."
        } else {
            ""
        };
        out.push_str(&format!("[{}] {label}\n{snippet}{ellipsis}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use lumen_memory::{Chunk, DocumentMetadata};

    use super::*;

    fn chunk(source: &str, content: &str) -> Chunk {
        Chunk {
            source_id: source.into(),
            content: content.into(),
            metadata: DocumentMetadata::new(source, "text/plain"),
            chunk_index: 0,
            start: 0,
        }
    }

    #[test]
    fn exit_words() {
        assert!(is_exit("quit"));
        assert!(is_exit(" EXIT "));
        assert!(is_exit("q"));
        assert!(!is_exit("question"));
        assert!(!is_exit(""));
    }

    #[test]
    fn render_lists_sources_with_snippets() {
        let long = "x".repeat(400);
        let answer = Answer {
            answer: "Paris.\n".into(),
            retrieved_docs: vec![chunk("capital.txt", "Paris is the capital."), chunk("", &long)],
        };
        let out = render_answer(&answer, Duration::from_millis(1500));
        assert!(out.contains("Answer: Paris.\n(answered in 1.50s)"));
        assert!(out.contains("[1] capital.txt\nParis is the capital.\n"));
        assert!(out.contains(&format!("[2] unknown source\n{}...\n", "x".repeat(300))));
    }

    #[test]
    fn render_without_sources() {
        let answer = Answer {
            answer: "Could not generate answer.".into(),
            retrieved_docs: vec![],
        };
        let out = render_answer(&answer, Duration::ZERO);
        assert!(!out.contains("Sources:"));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "lumen",
            "https://example.com",
            "notes.txt",
            "--agentic",
            "-q",
            "first?",
            "--question",
            "second?",
            "--config",
            "custom.toml",
            "--no-interactive",
        ])
        .unwrap();
        assert_eq!(cli.sources, ["https://example.com", "notes.txt"]);
        assert_eq!(cli.question, ["first?", "second?"]);
        assert!(cli.agentic);
        assert!(!cli.examples);
        assert!(cli.no_interactive);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["lumen"]).unwrap();
        assert!(cli.sources.is_empty());
        assert!(cli.config.is_none());
        assert!(cli.sources_file.is_none());
        assert!(!cli.agentic);
    }
}
