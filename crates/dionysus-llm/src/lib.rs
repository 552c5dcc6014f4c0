//! LLM provider abstraction, typed provider failures, and rate-limit backoff.

pub mod any;
pub mod compatible;
pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
mod openai;
pub mod provider;
pub mod retry;

pub use error::{FailureKind, LlmError};
pub use provider::LlmProvider;
pub use retry::{RateLimitedGenerator, RetryPolicy};
