//! Repository indexing: summarize, embed, refresh.

use futures::StreamExt as _;

use dionysus_index::loader::SourceFile;
use dionysus_index::{Document, EmbeddingService, Namespace, NamespaceCollectionStore};
use dionysus_llm::any::AnyProvider;

use crate::prompts;
use crate::summarize::Summarizer;

/// Outcome of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub namespace: String,
    pub collection: String,
    pub files: usize,
    pub summaries_failed: usize,
    pub embeddings_degraded: usize,
    /// Whether the refresh reached the store.
    pub stored: bool,
    pub duration_ms: u64,
}

struct Prepared {
    document: Document,
    summary_failed: bool,
    embedding_degraded: bool,
}

#[derive(Debug, Clone)]
pub struct RepositoryIndexer {
    summarizer: Summarizer,
    embeddings: EmbeddingService<AnyProvider>,
    store: NamespaceCollectionStore,
    concurrency: usize,
}

impl RepositoryIndexer {
    #[must_use]
    pub fn new(
        summarizer: Summarizer,
        embeddings: EmbeddingService<AnyProvider>,
        store: NamespaceCollectionStore,
        concurrency: usize,
    ) -> Self {
        Self {
            summarizer,
            embeddings,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Build documents for `files` and replace the namespace's collection with them.
    ///
    /// Files are processed `concurrency` at a time; order is preserved.
    pub async fn index(&self, namespace: &Namespace, files: Vec<SourceFile>) -> IndexReport {
        let start = std::time::Instant::now();
        let total = files.len();
        tracing::info!(%namespace, total, "indexing started");

        let prepared: Vec<Prepared> = futures::stream::iter(files)
            .map(|file| self.prepare(file))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = IndexReport {
            namespace: namespace.to_string(),
            collection: namespace.collection_name(),
            files: total,
            ..IndexReport::default()
        };
        let mut documents = Vec::with_capacity(prepared.len());
        for p in prepared {
            report.summaries_failed += usize::from(p.summary_failed);
            report.embeddings_degraded += usize::from(p.embedding_degraded);
            documents.push(p.document);
        }

        report.stored = self.store.refresh(namespace, documents).await;
        report.duration_ms = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        tracing::info!(
            %namespace,
            files = report.files,
            summaries_failed = report.summaries_failed,
            embeddings_degraded = report.embeddings_degraded,
            stored = report.stored,
            duration_ms = report.duration_ms,
            "indexing finished"
        );
        report
    }

    async fn prepare(&self, file: SourceFile) -> Prepared {
        let (summary, summary_failed) = match self
            .summarizer
            .try_summarize_file(&file.source, &file.content)
            .await
        {
            Ok(summary) => (summary, false),
            Err(e) => {
                tracing::warn!(source = %file.source, error = %e, "summary unavailable");
                (prompts::file_fallback(&file.source), true)
            }
        };

        // Quota during indexing degrades the document instead of aborting the run.
        let embedding = match self.embeddings.embed_document(&file.content).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(source = %file.source, error = %e, "storing zero vector");
                self.embeddings.zero_vector()
            }
        };

        let document = Document::new(file.source, &file.content, summary, embedding);
        let embedding_degraded = document.is_degraded();
        Prepared {
            document,
            summary_failed,
            embedding_degraded,
        }
    }
}
