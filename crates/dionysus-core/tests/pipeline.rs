use std::sync::Arc;

use dionysus_core::config::Config;
use dionysus_core::{Assistant, prompts};
use dionysus_index::loader::SourceFile;
use dionysus_index::{Document, Namespace, NamespaceCollectionStore};
use dionysus_llm::LlmError;
use dionysus_llm::any::AnyProvider;
use dionysus_llm::mock::{MockProvider, MockReply};
use dionysus_memory::InMemoryVectorStore;

fn config() -> Config {
    let mut config = Config::default();
    config.store.vector_size = 2;
    config.summary.base_delay_ms = 1;
    config
}

/// Embeds text mentioning `b.go` (or package b) along the second axis, everything else along the first.
fn embedder(reply: MockReply) -> MockProvider {
    MockProvider::always(reply)
        .named("gemini")
        .with_embed_fn(|text| {
            if text.contains("package b") || text.contains("b.go") {
                Ok(vec![0.0, 1.0])
            } else {
                Ok(vec![1.0, 0.0])
            }
        })
}

fn file(source: &str, content: &str) -> SourceFile {
    SourceFile {
        source: source.into(),
        content: content.into(),
    }
}

fn store() -> NamespaceCollectionStore {
    NamespaceCollectionStore::new(Arc::new(InMemoryVectorStore::new()), 2)
}

fn prompts_of(provider: &AnyProvider) -> Vec<String> {
    match provider {
        AnyProvider::Mock(m) => m.prompts(),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn indexed_namespace_uses_sanitized_collection() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::Text("sum".into()))));
    let assistant = Assistant::new(&config(), primary, None, store());
    let report = assistant
        .index_repository("github.com/acme/widget", vec![file("main.go", "package main")])
        .await;
    assert_eq!(report.collection, "CodeDoc_github_com_acme_widget");
    assert!(report.stored);
}

#[tokio::test]
async fn answer_context_contains_best_match_only() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::Text(
        "<p>a.go starts the server</p>".into(),
    ))));
    let mut cfg = config();
    cfg.retrieval.limit = 1;
    let assistant = Assistant::new(&cfg, Arc::clone(&primary), None, store());

    assistant
        .index_repository(
            "acme/widget",
            vec![file("a.go", "package a\nfunc Serve()"), file("b.go", "package b\nfunc Parse()")],
        )
        .await;

    let answer = assistant.answer_query("what does a.go do", "acme/widget").await;
    assert_eq!(answer, "<p>a.go starts the server</p>");

    let prompts = prompts_of(&primary);
    let answer_prompt = prompts.last().unwrap();
    assert!(answer_prompt.contains("--- File: a.go ---"));
    assert!(answer_prompt.contains("func Serve()"));
    assert!(!answer_prompt.contains("func Parse()"));
}

#[tokio::test]
async fn primary_quota_fails_over_with_banner() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::QuotaExceeded)));
    let secondary = Arc::new(AnyProvider::Mock(
        MockProvider::always(MockReply::Text("FALLBACK_OK".into())).named("groq"),
    ));
    let assistant = Assistant::new(&config(), primary, Some(secondary), store());

    let answer = assistant.answer_query("how is auth done", "acme/widget").await;
    assert!(answer.contains("Powered by Groq"));
    assert!(answer.ends_with("FALLBACK_OK"));
}

#[tokio::test]
async fn both_providers_failing_gives_generic_message() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::Fail(
        "internal".into(),
    ))));
    let secondary = Arc::new(AnyProvider::Mock(
        MockProvider::always(MockReply::Fail("also down".into())).named("groq"),
    ));
    let assistant = Assistant::new(&config(), primary, Some(secondary), store());

    let answer = assistant.answer_query("q", "acme/widget").await;
    assert_eq!(answer, prompts::GENERIC_FAILURE);
}

#[tokio::test]
async fn reindexing_replaces_previous_documents() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::Text("sum".into()))));
    let store = store();
    let assistant = Assistant::new(&config(), primary, None, store.clone());
    let ns = Namespace::new("acme/widget");

    assistant
        .index_repository("acme/widget", vec![file("old.go", "package old")])
        .await;
    assistant
        .index_repository(
            "acme/widget",
            vec![file("a.go", "package a"), file("b.go", "package b")],
        )
        .await;

    assert_eq!(store.count(&ns).await, Some(2));
    let hits = store.search(&ns, vec![1.0, 0.0], 10).await.unwrap();
    assert!(hits.iter().all(|d| d.source != "old.go"));
}

#[tokio::test]
async fn query_embedding_quota_answers_without_context() {
    let store = store();
    let ns = Namespace::new("acme/widget");
    store
        .refresh(&ns, vec![Document::new("a.go", "package a", "s", vec![1.0, 0.0])])
        .await;

    let primary = Arc::new(AnyProvider::Mock(
        MockProvider::always(MockReply::Text("general".into()))
            .with_embed_fn(|_| Err(LlmError::QuotaExceeded)),
    ));
    let assistant = Assistant::new(&config(), Arc::clone(&primary), None, store);

    assert_eq!(assistant.answer_query("q", "acme/widget").await, "general");
    let prompt = prompts_of(&primary).pop().unwrap();
    assert!(prompt.contains("embedding quota has been exceeded"));
    assert!(!prompt.contains("--- File: a.go ---"));
}

#[tokio::test]
async fn unavailable_store_still_answers() {
    let primary = Arc::new(AnyProvider::Mock(embedder(MockReply::Text("general".into()))));
    let assistant = Assistant::new(
        &config(),
        primary,
        None,
        NamespaceCollectionStore::unavailable(2),
    );
    let report = assistant
        .index_repository("acme/widget", vec![file("a.go", "package a")])
        .await;
    assert!(!report.stored);
    assert_eq!(assistant.answer_query("q", "acme/widget").await, "general");
}
