use thiserror::Error;

/// Errors produced by identifier operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The candidate does not satisfy the identifier format predicate.
    #[error("invalid identifier {candidate:?}: {reason}")]
    InvalidIdentifier { candidate: String, reason: String },
}
