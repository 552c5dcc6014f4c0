//! Text to vector with quota classification and a zero-vector fallback.

use std::sync::Arc;

use dionysus_llm::LlmProvider;
use dionysus_llm::provider::EmbedTask;

use crate::error::QuotaExceeded;

/// Collapse newlines to spaces and trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_owned()
}

/// Embeds text through a provider without caching.
///
/// Quota and rate signals fail with [`QuotaExceeded`]; every other failure
/// yields a zero vector of the configured dimension so the document still
/// ranks (last) instead of aborting the pipeline.
#[derive(Debug)]
pub struct EmbeddingService<P> {
    provider: Arc<P>,
    dimension: usize,
}

impl<P> Clone for EmbeddingService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            dimension: self.dimension,
        }
    }
}

impl<P: LlmProvider> EmbeddingService<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, dimension: usize) -> Self {
        Self {
            provider,
            dimension,
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dimension]
    }

    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] when the provider reports quota or rate exhaustion.
    pub async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>, QuotaExceeded> {
        let cleaned = normalize(text);
        match self.provider.embed(&cleaned, task).await {
            Ok(vector) if vector.len() == self.dimension => Ok(vector),
            Ok(vector) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    got = vector.len(),
                    expected = self.dimension,
                    "embedding dimension mismatch, using zero vector"
                );
                Ok(self.zero_vector())
            }
            Err(e) if e.kind().is_rate_signal() => {
                tracing::warn!(provider = self.provider.name(), error = %e, "embedding quota exceeded");
                Err(QuotaExceeded)
            }
            Err(e) => {
                tracing::error!(provider = self.provider.name(), error = %e, "embedding failed, using zero vector");
                Ok(self.zero_vector())
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] on quota or rate exhaustion.
    pub async fn embed_document(&self, text: &str) -> Result<Vec<f32>, QuotaExceeded> {
        self.embed(text, EmbedTask::RetrievalDocument).await
    }

    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] on quota or rate exhaustion.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, QuotaExceeded> {
        self.embed(text, EmbedTask::RetrievalQuery).await
    }
}
