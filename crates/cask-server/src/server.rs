use std::sync::Arc;

use cask_store::DataStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Serves one data store over HTTP.
pub struct CaskServer {
    config: ServerConfig,
    store: Arc<DataStore>,
}

impl CaskServer {
    pub fn new(config: ServerConfig, store: Arc<DataStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.store), self.config.max_request_size)
    }

    /// Bind the configured endpoint and serve until the process stops.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.endpoint.authority()).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> ServerResult<()> {
        let app = self.router();
        tracing::info!(
            endpoint = %self.config.endpoint,
            local_addr = ?listener.local_addr().ok(),
            "cask server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
