//! Indexed code units and the content length limit.

/// Maximum characters of file content kept for storage and prompting.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Dimension of stored embeddings.
pub const EMBEDDING_DIM: usize = 768;

/// Prefix of `s` holding at most `max_chars` characters, cut on a char boundary.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// One indexed file: path, bounded content, summary and its embedding.
///
/// A zero-filled embedding is a valid degraded value.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub content: String,
    pub summary: String,
    pub embedding: Vec<f32>,
}

impl Document {
    /// Build a document, truncating `content` to [`MAX_CONTENT_CHARS`].
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        content: &str,
        summary: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            source: source.into(),
            content: truncate_chars(content, MAX_CONTENT_CHARS).to_owned(),
            summary: summary.into(),
            embedding,
        }
    }

    /// True when the embedding carries no signal (all zeros).
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.embedding.iter().all(|v| *v == 0.0)
    }
}

/// A stored document as returned by retrieval. Vectors stay inside the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    pub source: String,
    pub content: String,
    pub summary: String,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn short_content_untouched() {
        let doc = Document::new("a.go", "package main", "entry", vec![0.1; 3]);
        assert_eq!(doc.content, "package main");
        assert!(!doc.is_degraded());
    }

    #[test]
    fn long_content_truncated() {
        let content = "x".repeat(MAX_CONTENT_CHARS + 500);
        let doc = Document::new("big.go", &content, "", vec![0.0; 3]);
        assert_eq!(doc.content.chars().count(), MAX_CONTENT_CHARS);
        assert!(doc.is_degraded());
    }

    #[test]
    fn truncate_respects_multibyte_chars() {
        let s = "héllo wörld";
        assert_eq!(truncate_chars(s, 2), "hé");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars(s, 0), "");
    }

    proptest! {
        #[test]
        fn truncation_keeps_exact_prefix(s in "\\PC{0,300}", max in 0usize..200) {
            let out = truncate_chars(&s, max);
            let expected: String = s.chars().take(max).collect();
            prop_assert_eq!(out, expected.as_str());
        }
    }
}
