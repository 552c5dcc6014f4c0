//! Configuration, summarization, indexing and answer orchestration.

pub mod answer;
pub mod assistant;
pub mod bootstrap;
pub mod config;
pub mod indexer;
pub mod prompts;
pub mod summarize;
pub mod vault;

pub use answer::{AnswerFailure, AnswerOrchestrator, ContextState};
pub use assistant::Assistant;
pub use bootstrap::AppBuilder;
pub use config::Config;
pub use indexer::{IndexReport, RepositoryIndexer};
pub use summarize::Summarizer;
