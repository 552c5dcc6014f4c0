//! Error types for dionysus-index.

/// The embedding provider reported quota or rate exhaustion.
///
/// This is the only failure that crosses the index boundary; callers route on
/// it (degraded context) instead of treating it as a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("embedding quota exceeded")]
pub struct QuotaExceeded;

/// Errors raised while loading a repository from disk.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error reading source files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Root path does not point at a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
