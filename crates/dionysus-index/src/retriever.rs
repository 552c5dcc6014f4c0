//! Best-effort semantic retrieval over a namespace collection.

use dionysus_llm::LlmProvider;

use crate::collection::NamespaceCollectionStore;
use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingService;
use crate::error::QuotaExceeded;
use crate::namespace::Namespace;

/// Default number of documents returned per query.
pub const DEFAULT_LIMIT: usize = 5;

/// Embeds a query and returns the closest stored documents in rank order.
#[derive(Debug, Clone)]
pub struct CodeRetriever<P> {
    store: NamespaceCollectionStore,
    embeddings: EmbeddingService<P>,
}

impl<P: LlmProvider> CodeRetriever<P> {
    #[must_use]
    pub fn new(store: NamespaceCollectionStore, embeddings: EmbeddingService<P>) -> Self {
        Self { store, embeddings }
    }

    #[must_use]
    pub fn store(&self) -> &NamespaceCollectionStore {
        &self.store
    }

    /// Retrieve up to `limit` documents for `query`.
    ///
    /// An unavailable store, a never-indexed namespace and search errors all
    /// yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] when the query cannot be embedded because of
    /// provider quota.
    pub async fn retrieve(
        &self,
        query: &str,
        namespace: &Namespace,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, QuotaExceeded> {
        if !self.store.is_available() {
            tracing::debug!(%namespace, "vector store unavailable, no context");
            return Ok(Vec::new());
        }
        if !self.store.exists(namespace).await {
            tracing::info!(%namespace, "namespace not indexed");
            return Ok(Vec::new());
        }

        let vector = self.embeddings.embed_query(query).await?;

        match self.store.search(namespace, vector, limit).await {
            Ok(docs) => {
                tracing::info!(%namespace, retrieved = docs.len(), "retrieved documents");
                Ok(docs)
            }
            Err(e) => {
                tracing::error!(%namespace, error = %e, "retrieval failed");
                Ok(Vec::new())
            }
        }
    }
}
