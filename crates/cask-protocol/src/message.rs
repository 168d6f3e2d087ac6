use cask_store::Database;
use cask_types::Identifier;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Reply codes carried by [`Reply::Error`].
pub mod codes {
    /// A supplied identifier failed the format predicate, or the request
    /// could not be decoded.
    pub const BAD_REQUEST: u32 = 400;
    /// The requested entry does not exist.
    pub const NOT_FOUND: u32 = 404;
    /// The request body exceeded the service's size limit.
    pub const TOO_LARGE: u32 = 413;
    /// Any other failure while applying the request.
    pub const INTERNAL: u32 = 500;
}

/// One data-store operation requested by a remote caller.
///
/// Identifiers travel as plain strings so that malformed ones reach the
/// store and come back as a `BAD_REQUEST` reply instead of failing to decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    Add { payload: Vec<u8> },
    Get { db: Database, id: String },
    Put { pointer: String, content: String },
    Remove { db: Database, id: String },
    Find { db: Database, prefix: String },
    Contains { db: Database, id: String },
}

/// The result of applying a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Added { id: Identifier },
    Payload { payload: Vec<u8> },
    Previous { content: Option<Identifier> },
    Removed { payload: Option<Vec<u8>> },
    Identifiers { ids: Vec<Identifier> },
    Contains { present: bool },
    Error { code: u32, message: String },
}

/// A message that can be framed by [`CaskCodec`](crate::CaskCodec).
pub trait Message: Serialize + DeserializeOwned {
    /// Frame tag. Unique across requests and replies.
    fn type_tag(&self) -> u8;

    fn type_name(&self) -> &'static str;
}

impl Message for Request {
    fn type_tag(&self) -> u8 {
        match self {
            Self::Add { .. } => 1,
            Self::Get { .. } => 2,
            Self::Put { .. } => 3,
            Self::Remove { .. } => 4,
            Self::Find { .. } => 5,
            Self::Contains { .. } => 6,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "Add",
            Self::Get { .. } => "Get",
            Self::Put { .. } => "Put",
            Self::Remove { .. } => "Remove",
            Self::Find { .. } => "Find",
            Self::Contains { .. } => "Contains",
        }
    }
}

impl Message for Reply {
    fn type_tag(&self) -> u8 {
        match self {
            Self::Added { .. } => 129,
            Self::Payload { .. } => 130,
            Self::Previous { .. } => 131,
            Self::Removed { .. } => 132,
            Self::Identifiers { .. } => 133,
            Self::Contains { .. } => 134,
            Self::Error { .. } => 255,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Added { .. } => "Added",
            Self::Payload { .. } => "Payload",
            Self::Previous { .. } => "Previous",
            Self::Removed { .. } => "Removed",
            Self::Identifiers { .. } => "Identifiers",
            Self::Contains { .. } => "Contains",
            Self::Error { .. } => "Error",
        }
    }
}

impl Reply {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
