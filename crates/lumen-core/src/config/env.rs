use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LUMEN_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid LUMEN_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("LUMEN_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("LUMEN_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LUMEN_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("LUMEN_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Ok(v) = std::env::var("LUMEN_INGEST_CHUNK_SIZE")
            && let Ok(n) = v.parse::<usize>()
        {
            self.ingest.chunk_size = n;
        }
        if let Ok(v) = std::env::var("LUMEN_INGEST_CHUNK_OVERLAP")
            && let Ok(n) = v.parse::<usize>()
        {
            self.ingest.chunk_overlap = n;
        }
        if let Ok(v) = std::env::var("LUMEN_INGEST_FAIL_FAST")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.ingest.fail_fast = enabled;
        }
        if let Ok(v) = std::env::var("LUMEN_RETRIEVAL_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.retrieval.k = k;
        }
        if let Ok(v) = std::env::var("LUMEN_AGENT_ENABLED")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.agent.enabled = enabled;
        }
        if let Ok(v) = std::env::var("LUMEN_AGENT_MAX_ITERATIONS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.agent.max_iterations = n;
        }
        if let Ok(v) = std::env::var("LUMEN_KB_ENABLED")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.agent.knowledge_base.enabled = enabled;
        }
        if let Ok(v) = std::env::var("LUMEN_KB_LANG") {
            self.agent.knowledge_base.lang = v;
        }

        let api_key = std::env::var("LUMEN_OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Some(key) = api_key {
            self.secrets.openai_api_key = Some(Secret::new(key));
        }
    }
}
