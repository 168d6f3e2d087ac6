use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of raw digest bytes behind an identifier (256 bits).
pub const IDENTIFIER_BYTES: usize = 32;

/// Number of hex characters in the canonical text form.
pub const IDENTIFIER_LENGTH: usize = IDENTIFIER_BYTES * 2;

/// The only characters allowed in an identifier, in nibble order.
pub const IDENTIFIER_DIGITS: &str = "0123456789abcdef";

/// Longest candidate echoed back inside an error message.
const MAX_ECHO: usize = IDENTIFIER_LENGTH + 8;

/// Content-addressed identifier, or an identifier-shaped pointer name.
///
/// An `Identifier` is always in canonical form: exactly 64 lowercase hex
/// characters. The only ways to build one are [`Identifier::parse`] (which
/// enforces the format predicate) and [`encode_hex`] (which produces the
/// canonical form from raw digest bytes), so holding an `Identifier` is proof
/// that the key is well formed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse a candidate, rejecting anything that fails the format predicate.
    pub fn parse(candidate: &str) -> Result<Self, TypeError> {
        validate_format(candidate)?;
        Ok(Self(candidate.to_owned()))
    }

    /// Build an identifier from raw digest bytes.
    pub fn from_digest(digest: &[u8; IDENTIFIER_BYTES]) -> Self {
        encode_hex(digest)
    }

    /// The canonical text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 characters) for logs and terminal output.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }

    /// Returns `true` if the canonical text starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Render raw digest bytes as an identifier: lowercase hex, two characters
/// per byte, most-significant nibble first.
pub fn encode_hex(digest: &[u8; IDENTIFIER_BYTES]) -> Identifier {
    Identifier(hex::encode(digest))
}

/// Returns `true` if `candidate` has the identifier length and alphabet.
pub fn is_valid_format(candidate: &str) -> bool {
    candidate.len() == IDENTIFIER_LENGTH
        && candidate
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Check the identifier format predicate.
///
/// Fails if the length is not [`IDENTIFIER_LENGTH`] or any character is
/// outside [`IDENTIFIER_DIGITS`]. Uppercase hex is rejected: the canonical
/// form is lowercase only.
pub fn validate_format(candidate: &str) -> Result<(), TypeError> {
    if candidate.len() != IDENTIFIER_LENGTH {
        return Err(invalid(
            candidate,
            format!(
                "expected {IDENTIFIER_LENGTH} characters, got {}",
                candidate.len()
            ),
        ));
    }
    if let Some(bad) = candidate.chars().find(|c| !IDENTIFIER_DIGITS.contains(*c)) {
        return Err(invalid(candidate, format!("disallowed character {bad:?}")));
    }
    Ok(())
}

fn invalid(candidate: &str, reason: String) -> TypeError {
    let candidate = if candidate.chars().count() > MAX_ECHO {
        let cut: String = candidate.chars().take(MAX_ECHO).collect();
        format!("{cut}...")
    } else {
        candidate.to_owned()
    };
    TypeError::InvalidIdentifier { candidate, reason }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.short())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_format(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&[u8]> for Identifier {
    type Error = TypeError;

    /// Parse the ASCII text form, as stored in a pointer entry.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match std::str::from_utf8(value) {
            Ok(text) => Self::parse(text),
            Err(_) => Err(TypeError::InvalidIdentifier {
                candidate: String::from_utf8_lossy(&value[..value.len().min(MAX_ECHO)])
                    .into_owned(),
                reason: "not valid UTF-8".into(),
            }),
        }
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}
