use thiserror::Error;

/// Errors from digest configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The requested digest algorithm is not available.
    #[error("no such digest algorithm: {0:?} (available: sha256, blake3)")]
    NoSuchAlgorithm(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
