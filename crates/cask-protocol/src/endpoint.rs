use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// HTTP endpoint paths for the cask protocol.
pub mod endpoints {
    /// `POST`: JSON [`Request`](crate::Request) in, JSON [`Reply`](crate::Reply) out.
    ///
    /// Payloads travel as JSON arrays of numbers, up to four body bytes per
    /// payload byte, so under the default body limit of
    /// [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE) a JSON `Add` carries
    /// about 16 MiB. Use [`RPC`] for larger payloads.
    pub const REQUEST: &str = "/v1/request";
    /// `POST`: framed binary request in, framed binary reply out.
    pub const RPC: &str = "/v1/rpc";
    /// `GET /v1/content/{id}`: raw payload of a content entry.
    pub const CONTENT: &str = "/v1/content";
    /// `GET /v1/pointer/{id}`: raw payload the pointer is bound to.
    pub const POINTER: &str = "/v1/pointer";
    pub const INFO: &str = "/v1/info";
    pub const HEALTH: &str = "/v1/health";
}

/// Default address of a cask service.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:7474";

/// Transport scheme of an [`Endpoint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
        }
    }
}

/// A service address of the form `scheme://host:port`.
///
/// Both schemes name the same HTTP service; `tcp` is accepted for
/// compatibility with addresses written for a raw socket transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        let invalid = |reason: &str| ProtocolError::InvalidEndpoint {
            endpoint: text.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = text
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://host:port"))?;
        let scheme = match scheme {
            "tcp" => Scheme::Tcp,
            "http" => Scheme::Http,
            _ => return Err(invalid("scheme must be tcp or http")),
        };
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("bad port"))?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    /// `host:port`, as accepted by a socket bind or connect call.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            scheme: Scheme::Tcp,
            host: "127.0.0.1".into(),
            port: 7474,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: super::message::PROTOCOL_VERSION,
        }
    }
}

/// Store description returned by the info endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub backend: String,
    pub algorithm: String,
    pub content_entries: usize,
    pub pointer_entries: usize,
}
