use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;

use cask_protocol::{codes, CaskCodec, HealthResponse, InfoResponse, Reply, Request};
use cask_store::{DataStore, Database, KeyedStore, StoreError};
use cask_types::Identifier;

use crate::dispatch::{dispatch, error_reply};

const OCTET_STREAM: &str = "application/octet-stream";

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(store): State<Arc<DataStore>>) -> Response {
    let info = run_blocking(store, |store| {
        Ok(InfoResponse {
            backend: store.backend().to_string(),
            algorithm: store.algorithm().to_string(),
            content_entries: store.content_db().len()?,
            pointer_entries: store.pointer_db().len()?,
        })
    })
    .await;
    match info {
        Ok(info) => Json(info).into_response(),
        Err(reply) => reply_response(reply),
    }
}

/// JSON request handler. A body that is not a valid [`Request`] gets a JSON
/// 400 reply, one over the body limit a JSON 413 reply.
pub async fn request_handler(
    State(store): State<Arc<DataStore>>,
    request: Result<Json<Request>, JsonRejection>,
) -> Response {
    let reply = match request {
        Ok(Json(request)) => run_blocking(store, move |store| Ok(dispatch(store, request)))
            .await
            .unwrap_or_else(|reply| reply),
        Err(rejection) => {
            let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                codes::TOO_LARGE
            } else {
                codes::BAD_REQUEST
            };
            Reply::error(code, rejection.body_text())
        }
    };
    reply_response(reply)
}

/// Framed binary request handler.
pub async fn rpc_handler(State(store): State<Arc<DataStore>>, body: Bytes) -> Response {
    let reply = match CaskCodec::decode::<Request>(&body) {
        Ok((request, _)) => run_blocking(store, move |store| Ok(dispatch(store, request)))
            .await
            .unwrap_or_else(|reply| reply),
        Err(e) => Reply::error(codes::BAD_REQUEST, e.to_string()),
    };
    let status = status_of(&reply);
    match CaskCodec::encode(&reply) {
        Ok(frame) => (status, [(header::CONTENT_TYPE, OCTET_STREAM)], frame).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Raw payload of a content entry; short identifiers are expanded.
pub async fn content_handler(
    State(store): State<Arc<DataStore>>,
    Path(id): Path<String>,
) -> Response {
    let payload = run_blocking(store, move |store| {
        let id = store.expand(Database::Content, &id)?;
        Ok(store.content_db().get(id.as_str())?.ok_or(id))
    })
    .await;
    raw_response(Database::Content, payload)
}

/// Raw payload a pointer is bound to; short identifiers are expanded.
pub async fn pointer_handler(
    State(store): State<Arc<DataStore>>,
    Path(id): Path<String>,
) -> Response {
    let payload = run_blocking(store, move |store| {
        let id = store.expand(Database::Pointer, &id)?;
        Ok(store.fetch(id.as_str())?.ok_or(id))
    })
    .await;
    raw_response(Database::Pointer, payload)
}

/// Run a store operation off the async executor; file backends block.
async fn run_blocking<T, F>(store: Arc<DataStore>, f: F) -> Result<T, Reply>
where
    T: Send + 'static,
    F: FnOnce(&DataStore) -> Result<T, StoreError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&store)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(error_reply(&e)),
        Err(e) => Err(Reply::error(codes::INTERNAL, format!("task failed: {e}"))),
    }
}

fn status_of(reply: &Reply) -> StatusCode {
    match reply {
        Reply::Error { code, .. } => u16::try_from(*code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        _ => StatusCode::OK,
    }
}

fn reply_response(reply: Reply) -> Response {
    (status_of(&reply), Json(reply)).into_response()
}

/// `Ok(Err(id))` is an expanded identifier with nothing behind it: an
/// unbound or dangling pointer, or content removed after expansion.
fn raw_response(db: Database, payload: Result<Result<Vec<u8>, Identifier>, Reply>) -> Response {
    match payload {
        Ok(Ok(bytes)) => ([(header::CONTENT_TYPE, OCTET_STREAM)], bytes).into_response(),
        Ok(Err(id)) => reply_response(Reply::error(codes::NOT_FOUND, format!("no {db} entry {id}"))),
        Err(reply) => reply_response(reply),
    }
}

