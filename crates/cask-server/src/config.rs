use std::path::Path;

use cask_protocol::{Endpoint, MAX_MESSAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub endpoint: Endpoint,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

fn default_max_request_size() -> usize {
    MAX_MESSAGE_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            max_request_size: default_max_request_size(),
        }
    }
}

impl ServerConfig {
    pub fn with_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// Replace the endpoint with `bind`, e.g. `tcp://0.0.0.0:9000`.
    pub fn with_bind(mut self, bind: &str) -> ServerResult<Self> {
        self.endpoint = Endpoint::parse(bind)?;
        Ok(self)
    }

    /// Load the `[server]` section of a TOML file; defaults when absent.
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let table: toml::Table = contents
            .parse()
            .map_err(|e| ServerError::Config(format!("failed to parse {}: {e}", path.display())))?;
        match table.get("server") {
            Some(section) => section
                .clone()
                .try_into()
                .map_err(|e| ServerError::Config(format!("invalid [server] section: {e}"))),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_protocol::Scheme;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.endpoint.to_string(), "tcp://127.0.0.1:7474");
        assert_eq!(c.max_request_size, 64 * 1024 * 1024);
    }

    #[test]
    fn from_file_reads_server_section() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cask.toml");
        std::fs::write(
            &path,
            "[store]\nroot = \"/srv\"\n\n[server]\nendpoint = \"http://0.0.0.0:8080\"\n",
        )
        .unwrap();
        let c = ServerConfig::from_file(&path).unwrap();
        assert_eq!(c.endpoint.scheme, Scheme::Http);
        assert_eq!(c.endpoint.port, 8080);
        assert_eq!(c.max_request_size, MAX_MESSAGE_SIZE);
    }

    #[test]
    fn from_file_rejects_bad_endpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cask.toml");
        std::fs::write(&path, "[server]\nendpoint = \"udp://x:1\"\n").unwrap();
        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn bind_override() {
        let c = ServerConfig::default().with_bind("tcp://0.0.0.0:9000").unwrap();
        assert_eq!(c.endpoint.host, "0.0.0.0");
        assert_eq!(c.endpoint.port, 9000);

        let err = ServerConfig::default().with_bind("udp://x:1").unwrap_err();
        assert!(matches!(err, ServerError::Protocol(_)));
    }

    #[test]
    fn missing_section_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cask.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(ServerConfig::from_file(&path).unwrap(), ServerConfig::default());
    }
}
