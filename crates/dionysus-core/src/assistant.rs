//! Public entry points: index a repository, answer a question, summarize a file or a diff.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dionysus_index::loader::{self, SourceFile};
use dionysus_index::{
    CodeRetriever, EMBEDDING_DIM, EmbeddingService, Namespace, NamespaceCollectionStore,
};
use dionysus_llm::any::AnyProvider;
use dionysus_llm::LlmProvider;

use crate::answer::{AnswerOrchestrator, Secondary};
use crate::config::Config;
use crate::indexer::{IndexReport, RepositoryIndexer};
use crate::summarize::Summarizer;

#[derive(Debug, Clone)]
pub struct Assistant {
    indexer: RepositoryIndexer,
    answers: AnswerOrchestrator,
    summarizer: Summarizer,
}

impl Assistant {
    /// Wire the pipeline from already constructed providers and store.
    ///
    /// Embeddings and answers go to `primary`. Summaries prefer `secondary`
    /// so bulk indexing does not drain the primary's quota.
    #[must_use]
    pub fn new(
        config: &Config,
        primary: Arc<AnyProvider>,
        secondary: Option<Arc<AnyProvider>>,
        store: NamespaceCollectionStore,
    ) -> Self {
        let summary_provider = secondary.clone().unwrap_or_else(|| Arc::clone(&primary));
        tracing::debug!(
            primary = primary.name(),
            summaries = summary_provider.name(),
            store_available = store.is_available(),
            "assembling assistant"
        );

        let summarizer = Summarizer::new(
            summary_provider,
            config.summary.retry_policy(),
            config.summary.file_max_tokens,
            config.summary.diff_max_tokens,
        );
        let dimension = usize::try_from(config.store.vector_size).unwrap_or(EMBEDDING_DIM);
        let embeddings = EmbeddingService::new(Arc::clone(&primary), dimension);

        let indexer = RepositoryIndexer::new(
            summarizer.clone(),
            embeddings.clone(),
            store.clone(),
            config.summary.concurrency,
        );
        let secondary = secondary.map(|provider| Secondary {
            provider,
            max_tokens: config.llm.fallback.max_tokens,
        });
        let answers = AnswerOrchestrator::new(
            CodeRetriever::new(store, embeddings),
            primary,
            secondary,
            config.retrieval.limit,
        );

        Self {
            indexer,
            answers,
            summarizer,
        }
    }

    /// Replace everything stored for `namespace` with `files`.
    pub async fn index_repository(&self, namespace: &str, files: Vec<SourceFile>) -> IndexReport {
        self.indexer.index(&Namespace::new(namespace), files).await
    }

    /// Load the indexable files under `root`, then index them as `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be walked.
    pub async fn index_directory(&self, namespace: &str, root: &Path) -> anyhow::Result<IndexReport> {
        let files = loader::load_repository(root)
            .await
            .with_context(|| format!("failed to load repository at {}", root.display()))?;
        Ok(self.index_repository(namespace, files).await)
    }

    pub async fn answer_query(&self, query: &str, namespace: &str) -> String {
        self.answers.answer(query, &Namespace::new(namespace)).await
    }

    pub async fn summarize_file(&self, source: &str, code: &str) -> String {
        self.summarizer.summarize_file(source, code).await
    }

    pub async fn summarize_diff(&self, diff: &str) -> String {
        self.summarizer.summarize_diff(diff).await
    }
}

#[cfg(test)]
mod tests {
    use dionysus_llm::mock::{MockProvider, MockReply};
    use dionysus_memory::InMemoryVectorStore;

    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.store.vector_size = 2;
        config
    }

    fn mock_of(provider: &AnyProvider) -> &MockProvider {
        match provider {
            AnyProvider::Mock(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn summaries_prefer_secondary() {
        let primary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("primary".into())).named("gemini"),
        ));
        let secondary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("secondary".into())).named("groq"),
        ));
        let assistant = Assistant::new(
            &config(),
            Arc::clone(&primary),
            Some(Arc::clone(&secondary)),
            NamespaceCollectionStore::unavailable(2),
        );
        assert_eq!(assistant.summarize_file("a.go", "x").await, "secondary");
        assert_eq!(mock_of(&primary).chat_calls(), 0);
    }

    #[tokio::test]
    async fn summaries_fall_back_to_primary() {
        let primary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("* changed".into())).named("gemini"),
        ));
        let assistant = Assistant::new(
            &config(),
            primary,
            None,
            NamespaceCollectionStore::unavailable(2),
        );
        assert_eq!(assistant.summarize_diff("+x").await, "* changed");
    }

    #[tokio::test]
    async fn index_directory_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.go"), "package main").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules").join("dep.js"), "x").unwrap();

        let primary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("summary".into()))
                .with_embed_fn(|_| Ok(vec![1.0, 0.0])),
        ));
        let store =
            NamespaceCollectionStore::new(Arc::new(InMemoryVectorStore::new()), 2);
        let assistant = Assistant::new(&config(), primary, None, store.clone());

        let report = assistant
            .index_directory("acme/app", dir.path())
            .await
            .unwrap();
        assert_eq!(report.files, 1);
        assert!(report.stored);
        assert_eq!(store.count(&Namespace::new("acme/app")).await, Some(1));
    }

    #[tokio::test]
    async fn index_directory_rejects_missing_root() {
        let assistant = Assistant::new(
            &config(),
            Arc::new(AnyProvider::Mock(MockProvider::default())),
            None,
            NamespaceCollectionStore::unavailable(2),
        );
        let missing = Path::new("/definitely/not/here");
        assert!(assistant.index_directory("x", missing).await.is_err());
    }
}
