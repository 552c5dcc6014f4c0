use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_pipeline();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("DIONYSUS_GEMINI_BASE_URL") {
            self.llm.gemini.base_url = v;
        }
        if let Ok(v) = std::env::var("DIONYSUS_GEMINI_MODEL") {
            self.llm.gemini.model = v;
        }
        if let Ok(v) = std::env::var("DIONYSUS_GEMINI_EMBEDDING_MODEL") {
            self.llm.gemini.embedding_model = v;
        }
        if let Ok(v) = std::env::var("DIONYSUS_FALLBACK_ENABLED")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.llm.fallback.enabled = enabled;
        }
        if let Ok(v) = std::env::var("DIONYSUS_FALLBACK_BASE_URL") {
            self.llm.fallback.base_url = v;
        }
        if let Ok(v) = std::env::var("DIONYSUS_FALLBACK_MODEL") {
            self.llm.fallback.model = v;
        }
    }

    fn apply_env_overrides_pipeline(&mut self) {
        if let Ok(v) = std::env::var("DIONYSUS_STORE_ENABLED")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.store.enabled = enabled;
        }
        if let Ok(v) = std::env::var("DIONYSUS_QDRANT_URL") {
            self.store.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("DIONYSUS_RETRIEVAL_LIMIT") {
            if let Ok(limit) = v.parse::<usize>() {
                self.retrieval.limit = limit;
            } else {
                tracing::warn!("ignoring invalid DIONYSUS_RETRIEVAL_LIMIT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DIONYSUS_SUMMARY_MAX_ATTEMPTS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.summary.max_attempts = n;
        }
        if let Ok(v) = std::env::var("DIONYSUS_SUMMARY_BASE_DELAY_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.summary.base_delay_ms = ms;
        }
        if let Ok(v) = std::env::var("DIONYSUS_SUMMARY_CONCURRENCY")
            && let Ok(n) = v.parse::<usize>()
        {
            self.summary.concurrency = n;
        }
    }
}
