use crate::compatible::CompatibleProvider;
use crate::error::LlmError;
use crate::gemini::GeminiProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::provider::{ChatOptions, EmbedTask, LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Gemini($p) => $expr,
            AnyProvider::Compatible($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Gemini(GeminiProvider),
    Compatible(CompatibleProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.chat(messages, options).await)
    }

    async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>, LlmError> {
        delegate_provider!(self, |p| p.embed(text, task).await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_gemini_name_and_embeddings() {
        let provider = AnyProvider::Gemini(GeminiProvider::new(
            "k".into(),
            crate::gemini::DEFAULT_BASE_URL.into(),
            "gemini-2.5-flash".into(),
            None,
            Some("text-embedding-004".into()),
        ));
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn any_compatible_name() {
        let provider = AnyProvider::Compatible(CompatibleProvider::new(
            "groq".into(),
            "k".into(),
            "https://api.groq.com/openai/v1".into(),
            "llama-3.1-8b-instant".into(),
            2000,
            None,
        ));
        assert_eq!(provider.name(), "groq");
    }

    #[tokio::test]
    async fn any_unreachable_chat_errors() {
        let provider = AnyProvider::Gemini(GeminiProvider::new(
            "k".into(),
            "http://127.0.0.1:1".into(),
            "m".into(),
            None,
            None,
        ));
        let err = provider
            .chat(&[Message::user("hi")], ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable));
    }
}
