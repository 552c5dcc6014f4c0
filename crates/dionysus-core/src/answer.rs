//! Query answering: retrieval, context assembly, and primary/secondary failover.

use std::sync::Arc;

use dionysus_index::{CodeRetriever, Namespace, QuotaExceeded, RetrievedDocument};
use dionysus_llm::any::AnyProvider;
use dionysus_llm::provider::{ChatOptions, Message};
use dionysus_llm::{FailureKind, LlmError, LlmProvider};

use crate::prompts;

const SECONDARY_TEMPERATURE: f32 = 0.5;

/// What retrieval produced for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextState {
    Ready(Vec<RetrievedDocument>),
    DegradedQuota,
    DegradedUnavailable,
    Empty,
}

impl ContextState {
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Ready(docs) => prompts::render_documents(docs),
            Self::DegradedQuota => prompts::QUOTA_CONTEXT.to_owned(),
            Self::DegradedUnavailable => prompts::STORE_UNAVAILABLE_CONTEXT.to_owned(),
            Self::Empty => prompts::EMPTY_CONTEXT.to_owned(),
        }
    }
}

/// Terminal failure shown to the user as one of three fixed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnswerFailure {
    #[error("provider quota exhausted")]
    Quota,
    #[error("provider credentials rejected")]
    Credentials,
    #[error("answer generation failed")]
    Generic,
}

impl AnswerFailure {
    #[must_use]
    pub fn from_kind(kind: FailureKind) -> Self {
        match kind {
            FailureKind::QuotaExceeded | FailureKind::RateLimited => Self::Quota,
            FailureKind::ConfigInvalid => Self::Credentials,
            FailureKind::Unavailable | FailureKind::Unknown => Self::Generic,
        }
    }

    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Quota => prompts::QUOTA_FAILURE,
            Self::Credentials => prompts::CREDENTIALS_FAILURE,
            Self::Generic => prompts::GENERIC_FAILURE,
        }
    }
}

/// Secondary provider tried once when the primary reports a rate signal.
#[derive(Debug, Clone)]
pub struct Secondary {
    pub provider: Arc<AnyProvider>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct AnswerOrchestrator {
    retriever: CodeRetriever<AnyProvider>,
    primary: Arc<AnyProvider>,
    secondary: Option<Secondary>,
    limit: usize,
}

impl AnswerOrchestrator {
    #[must_use]
    pub fn new(
        retriever: CodeRetriever<AnyProvider>,
        primary: Arc<AnyProvider>,
        secondary: Option<Secondary>,
        limit: usize,
    ) -> Self {
        Self {
            retriever,
            primary,
            secondary,
            limit,
        }
    }

    /// Retrieval always completes before generation starts.
    pub async fn gather_context(&self, query: &str, namespace: &Namespace) -> ContextState {
        match self.retriever.retrieve(query, namespace, self.limit).await {
            Err(QuotaExceeded) => {
                tracing::warn!(%namespace, "embedding quota exceeded, answering without context");
                ContextState::DegradedQuota
            }
            Ok(docs) if !docs.is_empty() => ContextState::Ready(docs),
            Ok(_) if !self.retriever.store().is_available() => ContextState::DegradedUnavailable,
            Ok(_) => ContextState::Empty,
        }
    }

    /// Answer `query` for `namespace`. Always yields user-facing text.
    pub async fn answer(&self, query: &str, namespace: &Namespace) -> String {
        tracing::info!(%namespace, "answering query");
        let context = self.gather_context(query, namespace).await;
        let prompt = prompts::answer_prompt(&context.render(), query);
        match self.generate(&prompt).await {
            Ok(answer) => answer,
            Err(failure) => failure.user_message().to_owned(),
        }
    }

    /// Primary generation with one failover attempt on a rate signal.
    ///
    /// # Errors
    ///
    /// Returns the failure class of the last provider tried.
    pub async fn generate(&self, prompt: &str) -> Result<String, AnswerFailure> {
        let messages = [Message::user(prompt)];
        let err = match self.primary.chat(&messages, ChatOptions::default()).await {
            Ok(answer) => {
                tracing::info!(provider = self.primary.name(), "answer generated");
                return Ok(answer);
            }
            Err(e) => e,
        };

        if !err.kind().is_rate_signal() {
            return Err(terminal(&self.primary, &err));
        }
        let Some(secondary) = &self.secondary else {
            tracing::warn!(provider = self.primary.name(), error = %err, "primary rate limited, no secondary configured");
            return Err(terminal(&self.primary, &err));
        };

        tracing::warn!(
            primary = self.primary.name(),
            secondary = secondary.provider.name(),
            "primary rate limited, failing over"
        );
        let options = ChatOptions::new(SECONDARY_TEMPERATURE, secondary.max_tokens);
        match secondary.provider.chat(&messages, options).await {
            Ok(answer) => Ok(format!(
                "{}\n\n{answer}",
                prompts::failover_banner(self.primary.name(), secondary.provider.name())
            )),
            Err(e) => Err(terminal(&secondary.provider, &e)),
        }
    }
}

fn terminal(provider: &AnyProvider, err: &LlmError) -> AnswerFailure {
    let failure = AnswerFailure::from_kind(err.kind());
    tracing::error!(provider = provider.name(), error = %err, ?failure, "answer failed");
    failure
}

#[cfg(test)]
mod tests {
    use dionysus_index::{Document, EmbeddingService, NamespaceCollectionStore};
    use dionysus_llm::mock::{MockProvider, MockReply};
    use dionysus_memory::InMemoryVectorStore;

    use super::*;

    fn mock(reply: MockReply) -> Arc<AnyProvider> {
        Arc::new(AnyProvider::Mock(MockProvider::always(reply).named("gemini")))
    }

    fn embedder() -> MockProvider {
        MockProvider::default().with_embed_fn(|_| Ok(vec![1.0, 0.0]))
    }

    fn orchestrator(
        store: NamespaceCollectionStore,
        embed: MockProvider,
        primary: Arc<AnyProvider>,
        secondary: Option<Arc<AnyProvider>>,
    ) -> AnswerOrchestrator {
        let retriever = CodeRetriever::new(
            store,
            EmbeddingService::new(Arc::new(AnyProvider::Mock(embed)), 2),
        );
        let secondary = secondary.map(|provider| Secondary {
            provider,
            max_tokens: 2000,
        });
        AnswerOrchestrator::new(retriever, primary, secondary, 5)
    }

    fn prompts_of(provider: &AnyProvider) -> Vec<String> {
        match provider {
            AnyProvider::Mock(m) => m.prompts(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn failure_classes() {
        assert_eq!(AnswerFailure::from_kind(FailureKind::RateLimited), AnswerFailure::Quota);
        assert_eq!(
            AnswerFailure::from_kind(FailureKind::ConfigInvalid),
            AnswerFailure::Credentials
        );
        assert_eq!(AnswerFailure::from_kind(FailureKind::Unavailable), AnswerFailure::Generic);
        assert_eq!(
            AnswerFailure::Generic.user_message(),
            prompts::GENERIC_FAILURE
        );
    }

    #[tokio::test]
    async fn unavailable_store_explains_missing_context() {
        let primary = mock(MockReply::Text("general".into()));
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            Arc::clone(&primary),
            None,
        );
        let ns = Namespace::new("acme/widget");
        assert_eq!(orch.gather_context("q", &ns).await, ContextState::DegradedUnavailable);
        assert_eq!(orch.answer("q", &ns).await, "general");
        assert!(prompts_of(&primary)[0].contains("vector database is currently not"));
    }

    #[tokio::test]
    async fn unindexed_namespace_is_empty_context() {
        let mem = Arc::new(InMemoryVectorStore::new());
        let orch = orchestrator(
            NamespaceCollectionStore::new(mem, 2),
            embedder(),
            mock(MockReply::Text("x".into())),
            None,
        );
        let ctx = orch.gather_context("q", &Namespace::new("acme/none")).await;
        assert_eq!(ctx, ContextState::Empty);
        assert!(ctx.render().contains("might not have been indexed"));
    }

    #[tokio::test]
    async fn embedding_quota_still_generates() {
        let mem = Arc::new(InMemoryVectorStore::new());
        let store = NamespaceCollectionStore::new(mem, 2);
        let ns = Namespace::new("acme/widget");
        store
            .refresh(&ns, vec![Document::new("a.go", "a", "s", vec![1.0, 0.0])])
            .await;
        let primary = mock(MockReply::Text("general answer".into()));
        let quota_embed = MockProvider::default().with_embed_fn(|_| Err(LlmError::QuotaExceeded));
        let orch = orchestrator(store, quota_embed, Arc::clone(&primary), None);

        assert_eq!(orch.answer("q", &ns).await, "general answer");
        assert!(prompts_of(&primary)[0].contains("embedding quota has been exceeded"));
    }

    #[tokio::test]
    async fn non_rate_primary_failure_skips_secondary() {
        let secondary = mock(MockReply::Text("never".into()));
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            mock(MockReply::ConfigInvalid),
            Some(Arc::clone(&secondary)),
        );
        let out = orch.answer("q", &Namespace::new("x")).await;
        assert_eq!(out, prompts::CREDENTIALS_FAILURE);
        assert!(prompts_of(&secondary).is_empty());
    }

    #[tokio::test]
    async fn quota_without_secondary_reports_quota() {
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            mock(MockReply::QuotaExceeded),
            None,
        );
        assert_eq!(orch.generate("p").await, Err(AnswerFailure::Quota));
    }

    #[tokio::test]
    async fn secondary_failure_classified_from_its_own_error() {
        let secondary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::ConfigInvalid).named("groq"),
        ));
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            mock(MockReply::RateLimited),
            Some(secondary),
        );
        assert_eq!(orch.generate("p").await, Err(AnswerFailure::Credentials));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_queries_overlap() {
        let primary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("answer".into()))
                .named("gemini")
                .with_delay(1_000),
        ));
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            Arc::clone(&primary),
            None,
        );
        let ns = Namespace::new("acme/widget");

        let start = tokio::time::Instant::now();
        let (a, b) = tokio::join!(orch.answer("first", &ns), orch.answer("second", &ns));
        let elapsed = start.elapsed();

        assert_eq!((a.as_str(), b.as_str()), ("answer", "answer"));
        assert_eq!(prompts_of(&primary).len(), 2);
        assert!(elapsed >= std::time::Duration::from_secs(1));
        assert!(elapsed < std::time::Duration::from_secs(2), "queries ran serially: {elapsed:?}");
    }

    #[tokio::test]
    async fn secondary_receives_same_prompt() {
        let primary = mock(MockReply::QuotaExceeded);
        let secondary = Arc::new(AnyProvider::Mock(
            MockProvider::always(MockReply::Text("ok".into())).named("groq"),
        ));
        let orch = orchestrator(
            NamespaceCollectionStore::unavailable(2),
            embedder(),
            Arc::clone(&primary),
            Some(Arc::clone(&secondary)),
        );
        let out = orch.generate("the prompt").await.unwrap();
        assert!(out.contains("Powered by Groq"));
        assert!(out.ends_with("ok"));
        assert_eq!(prompts_of(&primary), ["the prompt"]);
        assert_eq!(prompts_of(&secondary), ["the prompt"]);
    }
}
