//! Repository identifier to collection name mapping.
//!
//! Sanitization is lossy: `"a-b/c"` and `"a_b_c"` map to the same namespace.
//! Collection names already created in a store depend on this exact mapping,
//! so the collision is accepted rather than fixed.

use std::fmt;

/// Prefix of every namespace-bound collection.
pub const COLLECTION_PREFIX: &str = "CodeDoc_";

const REPLACED: [char; 4] = [':', '.', '-', '/'];

/// Replace `:`, `.`, `-` and `/` with `_`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.replace(REPLACED, "_")
}

/// A sanitized repository namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(sanitize(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn collection_name(&self) -> String {
        format!("{COLLECTION_PREFIX}{}", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
