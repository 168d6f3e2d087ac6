use std::path::PathBuf;

use cask_crypto::CryptoError;
use cask_types::{Identifier, TypeError};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A supplied key fails the identifier format predicate.
    #[error(transparent)]
    InvalidIdentifier(#[from] TypeError),

    /// The backing location could not be prepared or is unusable.
    #[error("cannot initialize store at {}: {reason}", .path.display())]
    Initialization { path: PathBuf, reason: String },

    /// The configured digest algorithm is unavailable.
    #[error(transparent)]
    NoSuchAlgorithm(#[from] CryptoError),

    /// A stored value cannot be decoded (e.g. a pointer that does not hold
    /// an identifier).
    #[error("corrupt entry {id}: {reason}")]
    Corrupt { id: Identifier, reason: String },

    /// No stored identifier starts with the given prefix.
    #[error("no identifier starts with {prefix:?}")]
    NotFound { prefix: String },

    /// More than one stored identifier starts with the given prefix.
    #[error("prefix {prefix:?} is ambiguous: {matches} identifiers match")]
    Ambiguous { prefix: String, matches: usize },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for format-predicate failures.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }

    pub(crate) fn poisoned<T>(err: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
