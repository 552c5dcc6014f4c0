//! Test-only mock LLM provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{ChatOptions, EmbedTask, LlmProvider, Message};

/// Scripted outcome for one provider call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    RateLimited,
    QuotaExceeded,
    Unavailable,
    ConfigInvalid,
    Fail(String),
}

impl MockReply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            Self::Text(t) => Ok(t),
            Self::RateLimited => Err(LlmError::RateLimited),
            Self::QuotaExceeded => Err(LlmError::QuotaExceeded),
            Self::Unavailable => Err(LlmError::Unavailable),
            Self::ConfigInvalid => Err(LlmError::ConfigInvalid("mock credentials".into())),
            Self::Fail(msg) => Err(LlmError::Other(msg)),
        }
    }
}

type EmbedFn = Arc<dyn Fn(&str) -> Result<Vec<f32>, LlmError> + Send + Sync>;

#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    chat_calls: Arc<AtomicUsize>,
    embed_calls: Arc<AtomicUsize>,
    embed_fn: Option<EmbedFn>,
    pub name: String,
    pub default_reply: MockReply,
    /// Simulated latency applied to every chat and embed call.
    pub delay_ms: u64,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("default_reply", &self.default_reply)
            .field("chat_calls", &self.chat_calls())
            .finish_non_exhaustive()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            chat_calls: Arc::new(AtomicUsize::new(0)),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            embed_fn: None,
            name: "mock".into(),
            default_reply: MockReply::Text("mock response".into()),
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    /// Replies are consumed in order; the default reply is used once they run out.
    #[must_use]
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Self::default()
        }
    }

    /// A provider whose every chat call fails with `reply`.
    #[must_use]
    pub fn always(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_embed_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<f32>, LlmError> + Send + Sync + 'static,
    {
        self.embed_fn = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Last user-visible content of every chat call, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message], _options: ChatOptions) -> Result<String, LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());
        reply.into_result()
    }

    async fn embed(&self, text: &str, _task: EmbedTask) -> Result<Vec<f32>, LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        match &self.embed_fn {
            Some(f) => f(text),
            None => Err(LlmError::EmbedUnsupported {
                provider: self.name.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
