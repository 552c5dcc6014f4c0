//! Google Gemini backend over the `generativelanguage` REST API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LlmError, classify_http_failure};
use crate::http::unreachable_or_http;
use crate::provider::{ChatOptions, EmbedTask, LlmProvider, Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    /// Output cap; `None` leaves it to the model so thinking tokens cannot starve the answer.
    max_tokens: Option<u32>,
    embedding_model: Option<String>,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(
        api_key: String,
        mut base_url: String,
        model: String,
        max_tokens: Option<u32>,
        embedding_model: Option<String>,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model,
            max_tokens,
            embedding_model,
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        model: &str,
        action: &str,
        body: &B,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/models/{model}:{action}", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(unreachable_or_http)?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!(%status, action, body = %text, "Gemini API error");
            return Err(classify_http_failure("gemini", status, &text));
        }
        Ok(text)
    }
}

impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<String, LlmError> {
        let (system, contents) = split_messages(messages);
        let body = GenerateRequest {
            contents,
            system_instruction: system,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens.or(self.max_tokens),
            },
        };

        let text = self.post(&self.model, "generateContent", &body).await?;
        let resp: GenerateResponse = serde_json::from_str(&text)?;

        let answer: String = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: "gemini".into(),
            });
        }
        Ok(answer)
    }

    async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>, LlmError> {
        let model = self
            .embedding_model
            .as_deref()
            .ok_or_else(|| LlmError::EmbedUnsupported {
                provider: "gemini".into(),
            })?;

        let qualified = format!("models/{model}");
        let body = EmbedRequest {
            model: &qualified,
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
            task_type: task.as_gemini_str(),
        };

        let text = self.post(model, "embedContent", &body).await?;
        let resp: EmbedResponse = serde_json::from_str(&text)?;
        Ok(resp.embedding.values)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "gemini"
    }
}

/// Gemini takes system prompts out-of-band and calls the assistant role `model`.
fn split_messages(messages: &[Message]) -> (Option<Content<'_>>, Vec<Content<'_>>) {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();
    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(Part { text: &msg.content }),
            Role::User => contents.push(Content {
                role: Some("user"),
                parts: vec![Part { text: &msg.content }],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model"),
                parts: vec![Part { text: &msg.content }],
            }),
        }
    }
    let system = (!system_parts.is_empty()).then(|| Content {
        role: None,
        parts: system_parts,
    });
    (system, contents)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::FailureKind;

    fn provider_at(base_url: String) -> GeminiProvider {
        GeminiProvider::new(
            "g-key".into(),
            base_url,
            "gemini-2.5-flash".into(),
            None,
            Some("text-embedding-004".into()),
        )
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", provider_at(DEFAULT_BASE_URL.into()));
        assert!(!debug.contains("g-key"));
        assert!(debug.contains("gemini-2.5-flash"));
    }

    #[test]
    fn split_messages_moves_system_out_of_band() {
        let msgs = vec![
            Message {
                role: Role::System,
                content: "be brief".into(),
            },
            Message::user("hi"),
            Message {
                role: Role::Assistant,
                content: "hello".into(),
            },
        ];
        let (system, contents) = split_messages(&msgs);
        assert_eq!(system.unwrap().parts[0].text, "be brief");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].role, Some("model"));
    }

    #[test]
    fn generate_request_uses_camel_case() {
        let msgs = [Message::user("q")];
        let (system, contents) = split_messages(&msgs);
        let body = GenerateRequest {
            contents,
            system_instruction: system,
            generation_config: GenerationConfig {
                temperature: None,
                max_output_tokens: Some(7),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 7);
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "q");
    }

    #[test]
    fn uncapped_request_omits_max_output_tokens() {
        let body = GenerationConfig {
            temperature: Some(0.3),
            max_output_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("maxOutputTokens").is_none());
    }

    #[tokio::test]
    async fn default_options_send_no_output_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({"generationConfig": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_at(server.uri())
            .chat(&[Message::user("q")], ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "ok");
        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[tokio::test]
    async fn per_call_cap_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(
                serde_json::json!({"generationConfig": {"maxOutputTokens": 150}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "short"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_at(server.uri())
            .chat(&[Message::user("q")], ChatOptions::new(0.3, 150))
            .await
            .unwrap();
        assert_eq!(out, "short");
    }

    #[tokio::test]
    async fn chat_concatenates_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "<p>a"}, {"text": "b</p>"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_at(server.uri())
            .chat(&[Message::user("q")], ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "<p>ab</p>");
    }

    #[tokio::test]
    async fn chat_without_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = provider_at(server.uri())
            .chat(&[Message::user("q")], ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn resource_exhausted_is_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string(
                r#"{"error":{"code":429,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#,
            ))
            .mount(&server)
            .await;

        let err = provider_at(server.uri())
            .chat(&[Message::user("q")], ChatOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn embed_sends_task_type_and_parses_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(body_partial_json(serde_json::json!({
                "model": "models/text-embedding-004",
                "taskType": "RETRIEVAL_QUERY"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": {"values": [0.1, 0.2, 0.3]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let v = provider_at(server.uri())
            .embed("what is this", EmbedTask::RetrievalQuery)
            .await
            .unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embed_without_model_is_unsupported() {
        let p = GeminiProvider::new("k".into(), "http://127.0.0.1:1".into(), "m".into(), None, None);
        let err = p.embed("x", EmbedTask::RetrievalDocument).await.unwrap_err();
        assert!(matches!(err, LlmError::EmbedUnsupported { .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let err = provider_at("http://127.0.0.1:1".into())
            .embed("x", EmbedTask::RetrievalDocument)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unavailable);
    }
}
