//! HTTP service for cask.
//!
//! Exposes one [`DataStore`](cask_store::DataStore) to remote callers. Each
//! inbound [`Request`](cask_protocol::Request) is applied to the store by
//! [`dispatch`](dispatch::dispatch) and answered with a
//! [`Reply`](cask_protocol::Reply), carried as JSON (`/v1/request`) or as a
//! binary frame (`/v1/rpc`). There is no authentication: bind to loopback
//! unless the network is trusted.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use dispatch::dispatch;
pub use error::{ServerError, ServerResult};
pub use server::CaskServer;
