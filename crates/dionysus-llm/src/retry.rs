//! Bounded exponential backoff around a generation call.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;
use crate::provider::{ChatOptions, LlmProvider, Message};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls made, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: BASE_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Wait after the failed attempt with zero-based index `attempt`: `base * 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(31))
    }
}

/// Retries a provider on rate-limit signals and degrades to a fallback string
/// for every other outcome, so callers never see an error.
#[derive(Debug)]
pub struct RateLimitedGenerator<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
}

impl<P> Clone for RateLimitedGenerator<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            policy: self.policy,
        }
    }
}

impl<P: LlmProvider> RateLimitedGenerator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run the call with backoff, returning the last error once attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the first non-rate-limit error, or the final rate-limit error after
    /// `max_attempts` calls.
    pub async fn try_generate(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<String, LlmError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.provider.chat(messages, options).await {
                Ok(text) => return Ok(text),
                Err(e) if e.kind().is_rate_signal() && attempt + 1 < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Like [`Self::try_generate`] but never fails: any terminal error yields `fallback`.
    pub async fn generate(&self, messages: &[Message], options: ChatOptions, fallback: &str) -> String {
        match self.try_generate(messages, options).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(provider = self.provider.name(), error = %e, "generation failed, using fallback");
                fallback.to_owned()
            }
        }
    }
}
