//! Wire protocol for cask.
//!
//! A remote caller sends one [`Request`] naming a data-store operation and
//! receives one [`Reply`]. Messages travel either as JSON or as a binary
//! frame produced by [`CaskCodec`]: `[u32 len][u8 tag][bincode payload]`.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use codec::CaskCodec;
pub use endpoint::{endpoints, Endpoint, HealthResponse, InfoResponse, Scheme, DEFAULT_ENDPOINT};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{codes, Message, Reply, Request, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
