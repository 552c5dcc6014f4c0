//! Best-effort file and commit-diff summaries.

use std::sync::Arc;

use dionysus_index::MAX_CONTENT_CHARS;
use dionysus_index::document::truncate_chars;
use dionysus_llm::any::AnyProvider;
use dionysus_llm::provider::{ChatOptions, Message};
use dionysus_llm::{LlmError, RateLimitedGenerator, RetryPolicy};

use crate::prompts;

const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Summaries never fail: rate limits are retried with backoff and any other
/// outcome becomes a fixed placeholder naming the unit.
#[derive(Debug, Clone)]
pub struct Summarizer {
    generator: RateLimitedGenerator<AnyProvider>,
    file_max_tokens: u32,
    diff_max_tokens: u32,
}

impl Summarizer {
    #[must_use]
    pub fn new(
        provider: Arc<AnyProvider>,
        policy: RetryPolicy,
        file_max_tokens: u32,
        diff_max_tokens: u32,
    ) -> Self {
        Self {
            generator: RateLimitedGenerator::new(provider, policy),
            file_max_tokens,
            diff_max_tokens,
        }
    }

    /// Like [`Self::summarize_file`] but reports the terminal error.
    pub(crate) async fn try_summarize_file(&self, source: &str, code: &str) -> Result<String, LlmError> {
        tracing::debug!(%source, "summarizing file");
        let code = truncate_chars(code, MAX_CONTENT_CHARS);
        let messages = [Message::user(prompts::file_summary_prompt(source, code))];
        self.generator
            .try_generate(
                &messages,
                ChatOptions::new(SUMMARY_TEMPERATURE, self.file_max_tokens),
            )
            .await
    }

    pub async fn summarize_file(&self, source: &str, code: &str) -> String {
        match self.try_summarize_file(source, code).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(%source, error = %e, "file summary failed");
                prompts::file_fallback(source)
            }
        }
    }

    pub async fn summarize_diff(&self, diff: &str) -> String {
        let diff = truncate_chars(diff, MAX_CONTENT_CHARS);
        let messages = [Message::user(prompts::diff_summary_prompt(diff))];
        self.generator
            .generate(
                &messages,
                ChatOptions::new(SUMMARY_TEMPERATURE, self.diff_max_tokens),
                prompts::DIFF_FALLBACK,
            )
            .await
    }
}
