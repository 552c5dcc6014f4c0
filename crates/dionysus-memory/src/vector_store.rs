use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("insert error: {0}")]
    Insert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("delete error: {0}")]
    Delete(String),
    #[error("count error: {0}")]
    Count(String),
}

/// Logical layout of a collection: named text payload fields plus one externally
/// supplied vector. The store never vectorizes on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub text_fields: Vec<String>,
    pub vector_size: u64,
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ScoredVectorPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

impl ScoredVectorPoint {
    /// String payload field, or empty when missing or not a string.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.payload
            .get(field)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Cheap liveness probe, used once at startup.
    fn health_check(&self) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    fn create_collection(
        &self,
        collection: &str,
        schema: &CollectionSchema,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Remove every point while keeping the collection and its schema.
    fn delete_all(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Insert points; a failure part-way leaves earlier points in place.
    fn bulk_insert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn nearest_neighbors(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>>;

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>>;
}
