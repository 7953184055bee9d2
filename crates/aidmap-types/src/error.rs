//! Lookup error type.

/// A name or id has no mapping.
///
/// Covers malformed name syntax, out-of-range numeric ids, and unknown
/// aliases alike; lookups never return partial results.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("no such identity: {0}")]
    NotFound(String),
}

impl IdError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}
