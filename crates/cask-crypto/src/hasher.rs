use std::fmt;
use std::str::FromStr;

use cask_types::{encode_hex, Identifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// The 256-bit digest used to derive content identifiers.
///
/// Every algorithm here yields 32 bytes, so identifiers keep their 64
/// character form regardless of the choice. A store must keep one algorithm
/// for its whole life: switching changes every content identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestAlgorithm {
    /// SHA-256 (FIPS 180-4).
    #[default]
    Sha256,
    /// BLAKE3 in its default 256-bit output mode.
    Blake3,
}

impl DigestAlgorithm {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(CryptoError::NoSuchAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigestAlgorithm> for String {
    fn from(algorithm: DigestAlgorithm) -> Self {
        algorithm.name().to_string()
    }
}

/// Content hasher: maps a payload to its content identifier.
///
/// The hash is taken over the payload bytes exactly, with no domain tag or
/// length prefix, so identifiers match what `sha256sum`/`b3sum` print for
/// the same bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: DigestAlgorithm,
}

impl ContentHasher {
    /// SHA-256 hasher (the default).
    pub const SHA256: Self = Self {
        algorithm: DigestAlgorithm::Sha256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: DigestAlgorithm::Blake3,
    };

    /// Create a hasher for the given algorithm.
    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash raw bytes into an identifier.
    pub fn hash(&self, data: &[u8]) -> Identifier {
        encode_hex(&self.raw_hash(data))
    }

    /// Raw 32-byte digest.
    pub fn raw_hash(&self, data: &[u8]) -> [u8; 32] {
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&Sha256::digest(data));
                out
            }
            DigestAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }

    /// Verify that data produces the expected identifier.
    pub fn verify(&self, data: &[u8], expected: &Identifier) -> bool {
        self.hash(data) == *expected
    }

    /// The algorithm used by this hasher.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

/// Hash a payload with the default algorithm (SHA-256).
pub fn digest(payload: &[u8]) -> Identifier {
    ContentHasher::SHA256.hash(payload)
}
