use cask_types::{encode_hex, Identifier, IDENTIFIER_BYTES};
use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a fresh random identifier from the operating system RNG.
///
/// Useful for naming new pointers. Random identifiers have nothing to do
/// with content addressing; they only share the format.
pub fn random_identifier() -> Identifier {
    let mut bytes = [0u8; IDENTIFIER_BYTES];
    OsRng.fill_bytes(&mut bytes);
    encode_hex(&bytes)
}
