//! HTTP API for the scanner.
//!
//! ## Modules
//!
//! - `handlers` - `GET /` and `GET /scan`
//! - `routes` - Axum router, merged with the shared health route
//! - `models` - query parameters, response rows and error bodies

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::{client_identity, ApiState};
pub use models::{ApiError, ScanParams, ScanRow};
pub use routes::create_router;
