//! Namespace-scoped code indexing and retrieval.
//!
//! Files are embedded through [`EmbeddingService`], stored per repository in a
//! sanitized collection by [`NamespaceCollectionStore`], and fetched back by
//! similarity through [`CodeRetriever`].

pub mod collection;
pub mod document;
pub mod embedding;
pub mod error;
pub mod loader;
pub mod namespace;
pub mod retriever;

pub use collection::NamespaceCollectionStore;
pub use document::{Document, EMBEDDING_DIM, MAX_CONTENT_CHARS, RetrievedDocument};
pub use embedding::EmbeddingService;
pub use error::{IndexError, QuotaExceeded, Result};
pub use namespace::Namespace;
pub use retriever::CodeRetriever;
