//! Early port availability check
//!
//! Checking before binding is racy: another process can take the port in
//! between. This only gives the operator a clear error at startup; the real
//! bind remains the source of truth.

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Fail fast if the configured HTTP port cannot be bound.
pub async fn validate_port_available(config: &ServerConfig) -> Result<()> {
    if config.http_port == 0 {
        debug!("Ephemeral port requested, skipping availability check");
        return Ok(());
    }

    let addr = config.address()?;

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            drop(listener);
            info!(%addr, "HTTP port is available");
            Ok(())
        }
        Err(e) => {
            error!(%addr, %e, "HTTP port is NOT available");
            Err(ServerError::port_in_use(config.http_port, e.to_string()))
        }
    }
}
