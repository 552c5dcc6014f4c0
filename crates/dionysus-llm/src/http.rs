//! Shared HTTP client and transport error mapping for provider calls.

use std::time::Duration;

use crate::error::LlmError;

/// Client shared by every provider: 30s connect timeout, 120s request timeout,
/// rustls, `dionysus/{version}` user-agent. Provider calls rely on these limits
/// instead of a pipeline-level cancellation token.
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(120))
        .user_agent(concat!("dionysus/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Connection failures mean the endpoint is down; anything else stays a transport error.
pub(crate) fn unreachable_or_http(e: reqwest::Error) -> LlmError {
    if e.is_connect() || e.is_timeout() {
        tracing::warn!(error = %e, "provider endpoint unreachable");
        LlmError::Unavailable
    } else {
        LlmError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let err = default_client()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        assert_eq!(unreachable_or_http(err).kind(), FailureKind::Unavailable);
    }
}
