//! Foundation types for cask.
//!
//! Every key accepted by a cask database is an [`Identifier`]: 64 lowercase
//! hexadecimal characters rendering a 256-bit digest. This crate owns the
//! canonical text form, the format predicate, and the hex codec. Every other
//! cask crate depends on `cask-types`.

pub mod error;
pub mod identifier;

pub use error::TypeError;
pub use identifier::{
    encode_hex, is_valid_format, validate_format, Identifier, IDENTIFIER_BYTES, IDENTIFIER_DIGITS,
    IDENTIFIER_LENGTH,
};
