use std::fmt;

use crate::error::LlmError;
use crate::openai::OpenAiClient;
use crate::provider::{ChatOptions, EmbedTask, LlmProvider, Message};

/// Named provider speaking the OpenAI chat-completions protocol (Groq and similar).
#[derive(Clone)]
pub struct CompatibleProvider {
    inner: OpenAiClient,
    provider_name: String,
}

impl CompatibleProvider {
    #[must_use]
    pub fn new(
        provider_name: String,
        api_key: String,
        base_url: String,
        model: String,
        max_tokens: u32,
        embedding_model: Option<String>,
    ) -> Self {
        let inner = OpenAiClient::new(api_key, base_url, model, max_tokens, embedding_model);
        Self {
            inner,
            provider_name,
        }
    }

}

impl fmt::Debug for CompatibleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibleProvider")
            .field("provider_name", &self.provider_name)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl LlmProvider for CompatibleProvider {
    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<String, LlmError> {
        self.inner
            .send_request(&self.provider_name, messages, options)
            .await
    }

    async fn embed(&self, text: &str, _task: EmbedTask) -> Result<Vec<f32>, LlmError> {
        self.inner
            .send_embed_request(&self.provider_name, text)
            .await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}
