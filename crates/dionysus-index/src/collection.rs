//! Namespace-bound collection lifecycle: create-if-absent and full refresh.

use std::collections::HashMap;
use std::sync::Arc;

use dionysus_memory::{CollectionSchema, VectorPoint, VectorStore, VectorStoreError};

use crate::document::{Document, MAX_CONTENT_CHARS, RetrievedDocument, truncate_chars};
use crate::namespace::Namespace;

/// Text fields every collection stores next to the vector.
pub const TEXT_FIELDS: [&str; 3] = ["source", "content", "summary"];

/// Owns the logical schema and refresh protocol for namespace collections.
///
/// Availability is decided once at construction. When the backing store is
/// unavailable every operation short-circuits to failure without touching it.
#[derive(Clone)]
pub struct NamespaceCollectionStore {
    store: Option<Arc<dyn VectorStore>>,
    vector_size: u64,
}

impl std::fmt::Debug for NamespaceCollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceCollectionStore")
            .field("available", &self.is_available())
            .field("vector_size", &self.vector_size)
            .finish()
    }
}

impl NamespaceCollectionStore {
    /// Wrap a store already known to be reachable.
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, vector_size: u64) -> Self {
        Self {
            store: Some(store),
            vector_size,
        }
    }

    /// A store that is absent for the whole process lifetime.
    #[must_use]
    pub fn unavailable(vector_size: u64) -> Self {
        Self {
            store: None,
            vector_size,
        }
    }

    /// Probe `store` once; an unreachable store yields [`Self::unavailable`].
    pub async fn connect(store: Arc<dyn VectorStore>, vector_size: u64) -> Self {
        match store.health_check().await {
            Ok(()) => {
                tracing::info!("vector store available");
                Self::new(store, vector_size)
            }
            Err(e) => {
                tracing::warn!(error = %e, "vector store unavailable, running without context");
                Self::unavailable(vector_size)
            }
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub fn vector_size(&self) -> u64 {
        self.vector_size
    }

    fn schema(&self) -> CollectionSchema {
        CollectionSchema {
            text_fields: TEXT_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            vector_size: self.vector_size,
        }
    }

    /// Whether the namespace has been indexed. Store errors read as `false`.
    pub async fn exists(&self, namespace: &Namespace) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        let collection = namespace.collection_name();
        match store.collection_exists(&collection).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(%collection, error = %e, "collection lookup failed");
                false
            }
        }
    }

    /// Create the namespace's collection if absent. Idempotent.
    ///
    /// Returns `false` when the store is unavailable or creation fails.
    pub async fn ensure_exists(&self, namespace: &Namespace) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        let collection = namespace.collection_name();
        match self.create_if_absent(store.as_ref(), &collection).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(%collection, error = %e, "failed to ensure collection");
                false
            }
        }
    }

    async fn create_if_absent(
        &self,
        store: &dyn VectorStore,
        collection: &str,
    ) -> Result<(), VectorStoreError> {
        if store.collection_exists(collection).await? {
            return Ok(());
        }
        store.create_collection(collection, &self.schema()).await?;
        tracing::info!(%collection, "created collection");
        Ok(())
    }

    /// Replace the namespace's contents with `documents`.
    ///
    /// Existing entries are deleted before insertion. A failed insert reports
    /// `false` without rolling back entries already written.
    pub async fn refresh(&self, namespace: &Namespace, documents: Vec<Document>) -> bool {
        let Some(store) = &self.store else {
            tracing::warn!(%namespace, "vector store unavailable, skipping refresh");
            return false;
        };
        let collection = namespace.collection_name();
        let total = documents.len();
        match self.replace_all(store.as_ref(), &collection, documents).await {
            Ok(()) => {
                tracing::info!(%collection, stored = total, "collection refreshed");
                true
            }
            Err(e) => {
                tracing::error!(%collection, error = %e, "refresh failed");
                false
            }
        }
    }

    async fn replace_all(
        &self,
        store: &dyn VectorStore,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), VectorStoreError> {
        self.create_if_absent(store, collection).await?;
        store.delete_all(collection).await?;
        let points = documents
            .into_iter()
            .map(|doc| document_to_point(collection, doc))
            .collect();
        store.bulk_insert(collection, points).await
    }

    /// Nearest stored documents to `vector`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the search fails.
    pub async fn search(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, VectorStoreError> {
        let Some(store) = &self.store else {
            return Err(VectorStoreError::Connection("vector store unavailable".into()));
        };
        let hits = store
            .nearest_neighbors(
                &namespace.collection_name(),
                vector,
                u64::try_from(limit).unwrap_or(u64::MAX),
            )
            .await?;
        Ok(hits
            .into_iter()
            .map(|hit| RetrievedDocument {
                source: hit.text("source"),
                content: hit.text("content"),
                summary: hit.text("summary"),
                score: hit.score,
            })
            .collect())
    }

    /// Number of stored entries, or `None` when unknown.
    pub async fn count(&self, namespace: &Namespace) -> Option<u64> {
        let store = self.store.as_ref()?;
        store.count(&namespace.collection_name()).await.ok()
    }
}

fn point_id(collection: &str, source: &str) -> String {
    uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        format!("{collection}/{source}").as_bytes(),
    )
    .to_string()
}

fn document_to_point(collection: &str, doc: Document) -> VectorPoint {
    let content = truncate_chars(&doc.content, MAX_CONTENT_CHARS).to_owned();
    VectorPoint {
        id: point_id(collection, &doc.source),
        vector: doc.embedding,
        payload: HashMap::from([
            ("source".to_owned(), serde_json::Value::String(doc.source)),
            ("content".to_owned(), serde_json::Value::String(content)),
            ("summary".to_owned(), serde_json::Value::String(doc.summary)),
        ]),
    }
}
