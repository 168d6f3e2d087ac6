//! Cryptographic primitives for cask.
//!
//! Provides the content digest (SHA-256 by default, BLAKE3 selectable) that
//! turns a payload into its [`Identifier`](cask_types::Identifier), and a
//! secure random identifier generator for fresh pointer names.
//!
//! All crypto operations wrap established libraries. No custom cryptography.

pub mod error;
pub mod hasher;
pub mod random;

pub use error::{CryptoError, CryptoResult};
pub use hasher::{digest, ContentHasher, DigestAlgorithm};
pub use random::random_identifier;
