use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// OpenAI-compatible secondary provider used when the primary is rate limited.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

fn default_gemini_base_url() -> String {
    dionysus_llm::gemini::DEFAULT_BASE_URL.into()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_gemini_embedding_model() -> String {
    "text-embedding-004".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_embedding_model")]
    pub embedding_model: String,
    /// Output cap for answers. Unset by default: thinking models spend the cap
    /// on reasoning first and can return no text under a small one.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            embedding_model: default_gemini_embedding_model(),
            max_tokens: None,
        }
    }
}

fn default_fallback_name() -> String {
    "groq".into()
}

fn default_fallback_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_fallback_model() -> String {
    "llama-3.1-8b-instant".into()
}

fn default_fallback_max_tokens() -> u32 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_fallback_name")]
    pub name: String,
    #[serde(default = "default_fallback_base_url")]
    pub base_url: String,
    #[serde(default = "default_fallback_model")]
    pub model: String,
    #[serde(default = "default_fallback_max_tokens")]
    pub max_tokens: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_fallback_name(),
            base_url: default_fallback_base_url(),
            model: default_fallback_model(),
            max_tokens: default_fallback_max_tokens(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_vector_size() -> u64 {
    dionysus_index::EMBEDDING_DIM as u64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default = "default_vector_size")]
    pub vector_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            qdrant_url: default_qdrant_url(),
            vector_size: default_vector_size(),
        }
    }
}

fn default_retrieval_limit() -> usize {
    dionysus_index::retriever::DEFAULT_LIMIT
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_limit")]
    pub limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_retrieval_limit(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_concurrency() -> usize {
    4
}

fn default_file_max_tokens() -> u32 {
    150
}

fn default_diff_max_tokens() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Files summarized and embedded in parallel during indexing.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_file_max_tokens")]
    pub file_max_tokens: u32,
    #[serde(default = "default_diff_max_tokens")]
    pub diff_max_tokens: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            concurrency: default_concurrency(),
            file_max_tokens: default_file_max_tokens(),
            diff_max_tokens: default_diff_max_tokens(),
        }
    }
}

impl SummaryConfig {
    #[must_use]
    pub fn retry_policy(&self) -> dionysus_llm::RetryPolicy {
        dionysus_llm::RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: std::time::Duration::from_millis(self.base_delay_ms),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub gemini_api_key: Option<Secret>,
    pub fallback_api_key: Option<Secret>,
    pub qdrant_api_key: Option<Secret>,
}
