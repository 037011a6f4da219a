//! Server infrastructure for volscan
//!
//! Provides the HTTP server lifecycle shared by the scanner API: binding,
//! graceful shutdown on SIGINT or SIGTERM, health endpoints and early
//! port validation.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::new("0.0.0.0", 8000);
//!     let server = HttpServer::new(config, router);
//!     server.run_until_signal().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Bind address configuration
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`health`] - Health check endpoint
//! - [`shutdown`] - Graceful shutdown utilities

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::{ServerConfig, DEFAULT_HTTP_PORT};
pub use error::{Result, ServerError};
pub use health::{health_routes, HealthState};
pub use http::HttpServer;
pub use port_validator::validate_port_available;
pub use shutdown::{shutdown_signal, ShutdownController};
pub use traits::{Server, ServerExt};
