//! Server bind configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Default HTTP port for the scanner
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Where the HTTP server binds
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::new("127.0.0.1", 8000);
/// assert_eq!(config.address().unwrap().port(), 8000);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// HTTP port; 0 binds an ephemeral port
    pub http_port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    /// Loopback config on an ephemeral port, used by tests
    pub fn ephemeral() -> Self {
        Self::new("127.0.0.1", 0)
    }

    /// Parse the socket address from host and port
    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", DEFAULT_HTTP_PORT)
    }
}
