use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{QuickNotesError, Result};

pub const DATA_DIR: &str = ".quicknotes";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Settings for the note store service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DATA_DIR).join(crate::storage::NOTES_DB),
        }
    }
}

impl ServerConfig {
    /// Resolve host and port into a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| QuickNotesError::Config(format!("Invalid bind address {}: {}", addr, e)))
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL up to and including `/api`.
    pub api_url: String,
    pub prefs_path: PathBuf,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            prefs_path: PathBuf::from(DATA_DIR).join(crate::client::PREFS_FILE),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.db_path, PathBuf::from(".quicknotes/notes.db"));
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        let err = config.bind_addr().unwrap_err();
        assert!(matches!(err, QuickNotesError::Config(_)));
        assert!(err.to_string().contains("not a host"));
    }

    #[test]
    fn test_api_base_trims_trailing_slash() {
        let config = ClientConfig {
            api_url: "http://example.test/api/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.api_base(), "http://example.test/api");
    }

    #[test]
    fn test_serialization() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.prefs_path, config.prefs_path);
    }
}
