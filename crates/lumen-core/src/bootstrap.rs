//! Wiring from a [`Config`] to a ready-to-run graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use lumen_llm::LlmProvider;
use lumen_llm::any::AnyProvider;
use lumen_llm::ollama::OllamaProvider;
use lumen_llm::openai::OpenAiProvider;
use lumen_memory::{
    IndexRetriever, SourceLoader, SplitterConfig, TextSplitter, VectorIndex,
};
use lumen_tools::{RetrieverTool, ToolRegistry, WikipediaTool};

use crate::config::{Config, ProviderKind};
use crate::generator::{AnswerGenerator, AnyGenerator, ReactGenerator};
use crate::graph::RagGraph;

/// Graph type the binary runs, whichever generator is configured.
pub type AppGraph = RagGraph<IndexRetriever, AnyGenerator<AnyProvider>>;

/// Priority: `cli` > `LUMEN_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("LUMEN_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// # Errors
///
/// Returns an error if the OpenAI backend is selected without an API key.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    match config.llm.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            &config.llm.base_url,
            config.llm.model.clone(),
            config.llm.embedding_model.clone(),
        ))),
        ProviderKind::OpenAi => {
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("LUMEN_OPENAI_API_KEY or OPENAI_API_KEY not set")?
                .expose()
                .to_owned();
            let embedding_model = Some(config.llm.embedding_model.clone())
                .filter(|m| !m.trim().is_empty());
            Ok(AnyProvider::OpenAi(OpenAiProvider::new(
                api_key,
                config.llm.base_url.clone(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                embedding_model,
            )))
        }
    }
}

pub async fn health_check(provider: &AnyProvider) {
    if let AnyProvider::Ollama(ollama) = provider {
        match ollama.health_check().await {
            Ok(()) => tracing::info!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        }
    }
}

/// Source descriptors to ingest: `cli` if non-empty, else `sources_file` if
/// given, else the configured sources file if it exists and lists anything,
/// else `ingest.default_urls`.
///
/// # Errors
///
/// Returns an error if an explicit `sources_file` is missing, unreadable or
/// lists no sources, or if the configured file exists but cannot be read.
pub fn resolve_sources(
    cli: &[String],
    sources_file: Option<&Path>,
    config: &Config,
) -> anyhow::Result<Vec<String>> {
    if !cli.is_empty() {
        return Ok(cli.to_vec());
    }
    if let Some(path) = sources_file {
        let sources = read_sources_file(path)?;
        if sources.is_empty() {
            bail!("sources file {} lists no sources", path.display());
        }
        tracing::info!(path = %path.display(), count = sources.len(), "using sources file");
        return Ok(sources);
    }
    let path = Path::new(&config.ingest.sources_file);
    if path.is_file() {
        let sources = read_sources_file(path)?;
        if !sources.is_empty() {
            tracing::info!(path = %path.display(), count = sources.len(), "using sources file");
            return Ok(sources);
        }
    }
    Ok(config.ingest.default_urls.clone())
}

/// One descriptor per line; blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_sources_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sources file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

/// Load, split and embed `sources` into a built index.
///
/// # Errors
///
/// Returns an error if the provider cannot embed, a source fails to load, the
/// splitter settings are invalid, or embedding fails.
pub async fn build_index(
    config: &Config,
    provider: &AnyProvider,
    sources: &[String],
) -> anyhow::Result<Arc<VectorIndex>> {
    if !provider.supports_embeddings() {
        bail!(
            "provider {} has no embedding model configured",
            provider.name()
        );
    }

    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: config.ingest.chunk_size,
        chunk_overlap: config.ingest.chunk_overlap,
    })?;

    let documents = SourceLoader::new(config.ingest.max_file_size)
        .with_fail_fast(config.ingest.fail_fast)
        .load(sources)
        .await
        .context("failed to load sources")?;
    let chunks = splitter.split_all(&documents);
    tracing::info!(
        documents = documents.len(),
        chunks = chunks.len(),
        "split documents"
    );

    let index = VectorIndex::new(provider.embed_fn());
    index
        .build(chunks)
        .await
        .context("failed to build index")?;
    Ok(Arc::new(index))
}

/// Tools offered to the agent: the corpus retriever, plus Wikipedia when
/// the knowledge base is enabled.
#[must_use]
pub fn build_tools(config: &Config, retriever: Arc<IndexRetriever>) -> ToolRegistry {
    let registry = ToolRegistry::new().with_tool(RetrieverTool::new(retriever));
    let kb = &config.agent.knowledge_base;
    if !kb.enabled {
        return registry;
    }
    let wikipedia = match &kb.base_url {
        Some(base_url) => WikipediaTool::with_base_url(base_url, kb.top_k),
        None => WikipediaTool::new(&kb.lang, kb.top_k),
    };
    registry.with_tool(wikipedia)
}

#[must_use]
pub fn build_generator(
    config: &Config,
    provider: Arc<AnyProvider>,
    retriever: Arc<IndexRetriever>,
) -> AnyGenerator<AnyProvider> {
    if config.agent.enabled {
        let tools = Arc::new(build_tools(config, retriever));
        tracing::info!(tools = ?tools.names(), "using agentic generator");
        AnyGenerator::Agentic(
            ReactGenerator::new(provider, tools).with_max_iterations(config.agent.max_iterations),
        )
    } else {
        AnyGenerator::Classic(AnswerGenerator::new(provider))
    }
}

/// # Errors
///
/// Returns an error if `retrieval.k` is zero.
pub fn build_graph(
    config: &Config,
    provider: AnyProvider,
    index: Arc<VectorIndex>,
) -> anyhow::Result<AppGraph> {
    let retriever = Arc::new(IndexRetriever::new(index, config.retrieval.k)?);
    let generator = build_generator(config, Arc::new(provider), Arc::clone(&retriever));
    let graph = RagGraph::new(retriever, Arc::new(generator));
    graph.build();
    Ok(graph)
}
