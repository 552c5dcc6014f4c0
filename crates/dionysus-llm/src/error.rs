/// Closed set of failure classes that routing decisions switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    QuotaExceeded,
    RateLimited,
    Unavailable,
    ConfigInvalid,
    Unknown,
}

impl FailureKind {
    /// True for quota and rate-limit signals, which are retried with backoff
    /// and trigger failover to the secondary provider.
    #[must_use]
    pub fn is_rate_signal(self) -> bool {
        matches!(self, Self::QuotaExceeded | Self::RateLimited)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("rate limited")]
    RateLimited,

    #[error("provider unavailable")]
    Unavailable,

    #[error("invalid provider configuration: {0}")]
    ConfigInvalid(String),

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::QuotaExceeded => FailureKind::QuotaExceeded,
            Self::RateLimited => FailureKind::RateLimited,
            Self::Unavailable => FailureKind::Unavailable,
            Self::ConfigInvalid(_) | Self::EmbedUnsupported { .. } => FailureKind::ConfigInvalid,
            Self::Http(e) if e.is_connect() || e.is_timeout() => FailureKind::Unavailable,
            Self::Http(e) if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => {
                FailureKind::RateLimited
            }
            Self::Http(_) | Self::Json(_) | Self::EmptyResponse { .. } | Self::Other(_) => {
                FailureKind::Unknown
            }
        }
    }
}

/// Map a non-success HTTP response to a typed error.
///
/// Quota exhaustion is recognised from the body because Gemini and OpenAI-style
/// APIs both answer 429 for plain throttling as well as for a depleted quota.
#[must_use]
pub fn classify_http_failure(provider: &str, status: reqwest::StatusCode, body: &str) -> LlmError {
    let lower = body.to_lowercase();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        if lower.contains("quota") || lower.contains("resource_exhausted") {
            return LlmError::QuotaExceeded;
        }
        return LlmError::RateLimited;
    }

    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || lower.contains("api_key_invalid")
        || lower.contains("api key not valid")
        || lower.contains("invalid_api_key")
    {
        return LlmError::ConfigInvalid(format!("{provider} rejected credentials (status {status})"));
    }

    if status.is_server_error() {
        return LlmError::Unavailable;
    }

    LlmError::Other(format!("{provider} request failed (status {status})"))
}

pub type Result<T> = std::result::Result<T, LlmError>;
