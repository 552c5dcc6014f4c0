//! Local repository loader: walk a checked-out tree and yield source files.

use std::path::{Component, Path};

use crate::error::{IndexError, Result};

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "__pycache__",
    "venv",
    "env",
    ".venv",
    "vendor",
    "target",
    ".next",
    "out",
    "coverage",
    ".pytest_cache",
];

const EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Gemfile.lock",
    "composer.lock",
    "Cargo.lock",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    // binary and media
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "mp4", "avi", "mov", "mp3", "wav", "pdf",
    "zip", "tar", "gz", "7z",
    // docs
    "md", "txt", "rst",
    // config and data
    "json", "yaml", "yml", "toml", "ini", "xml", "csv", "tsv",
    // compiled
    "pyc", "pyo", "class", "o", "so", "dll", "exe", "wasm", "map",
    // databases
    "db", "sqlite", "sqlite3",
];

/// One loaded file, keyed by its repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub source: String,
    pub content: String,
}

/// Whether a repository-relative path is worth summarizing and embedding.
#[must_use]
pub fn is_indexable(rel_path: &Path) -> bool {
    let in_excluded_dir = rel_path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|c| matches!(c, Component::Normal(name) if EXCLUDED_DIRS.iter().any(|d| name == *d)));
    if in_excluded_dir {
        return false;
    }

    let Some(file_name) = rel_path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if EXCLUDED_FILES.contains(&file_name) {
        return false;
    }

    !rel_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            EXCLUDED_EXTENSIONS
                .iter()
                .any(|x| x.eq_ignore_ascii_case(ext))
        })
}

/// Walk `root` (gitignore-aware, hidden entries skipped) and read every
/// indexable UTF-8 file. Results are sorted by path.
///
/// # Errors
///
/// Returns an error if `root` is not a directory.
pub async fn load_repository(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(IndexError::NotADirectory(root.display().to_string()));
    }

    let mut paths: Vec<_> = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|p| is_indexable(p.strip_prefix(root).unwrap_or(p)))
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => files.push(SourceFile { source, content }),
            Err(e) => tracing::debug!(file = %source, error = %e, "skipping non-text file"),
        }
    }

    tracing::info!(root = %root.display(), files = files.len(), "repository loaded");
    Ok(files)
}
