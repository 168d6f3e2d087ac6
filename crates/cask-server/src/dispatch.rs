//! Applies one protocol [`Request`] to a [`DataStore`].

use cask_protocol::{codes, Message, Reply, Request};
use cask_store::{DataStore, KeyedStore, StoreError};
use tracing::{debug, warn};

/// Apply `request` to `store` and describe the outcome as a [`Reply`].
///
/// Never fails: store errors become [`Reply::Error`] with the code from
/// [`error_code`].
pub fn dispatch(store: &DataStore, request: Request) -> Reply {
    let op = request.type_name();
    let reply = apply(store, request).unwrap_or_else(|e| error_reply(&e));
    match &reply {
        Reply::Error { code, message } if *code >= codes::INTERNAL => {
            warn!(op, code, message = %message, "request failed");
        }
        other => debug!(op, reply = other.type_name(), "request handled"),
    }
    reply
}

fn apply(store: &DataStore, request: Request) -> Result<Reply, StoreError> {
    Ok(match request {
        Request::Add { payload } => Reply::Added {
            id: store.content_db().add(&payload)?,
        },
        Request::Get { db, id } => match store.database(db).get(&id)? {
            Some(payload) => Reply::Payload { payload },
            None => Reply::error(codes::NOT_FOUND, format!("no {db} entry {id}")),
        },
        Request::Put { pointer, content } => Reply::Previous {
            content: store.pointer_db().put(&pointer, &content)?,
        },
        Request::Remove { db, id } => Reply::Removed {
            payload: store.database(db).remove(&id)?,
        },
        Request::Find { db, prefix } => {
            let mut ids: Vec<_> = store.database(db).find(&prefix)?.into_iter().collect();
            ids.sort();
            Reply::Identifiers { ids }
        }
        Request::Contains { db, id } => Reply::Contains {
            present: store.database(db).contains_key(&id)?,
        },
    })
}

/// Reply code for a store error.
pub fn error_code(err: &StoreError) -> u32 {
    match err {
        StoreError::InvalidIdentifier(_) | StoreError::Ambiguous { .. } => codes::BAD_REQUEST,
        StoreError::NotFound { .. } => codes::NOT_FOUND,
        _ => codes::INTERNAL,
    }
}

pub fn error_reply(err: &StoreError) -> Reply {
    Reply::error(error_code(err), err.to_string())
}
