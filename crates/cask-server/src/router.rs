use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use cask_protocol::endpoints;
use cask_store::DataStore;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router with all cask endpoints.
pub fn build_router(store: Arc<DataStore>, max_request_size: usize) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::INFO, get(handler::info_handler))
        .route(endpoints::REQUEST, post(handler::request_handler))
        .route(endpoints::RPC, post(handler::rpc_handler))
        .route(&format!("{}/:id", endpoints::CONTENT), get(handler::content_handler))
        .route(&format!("{}/:id", endpoints::POINTER), get(handler::pointer_handler))
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
