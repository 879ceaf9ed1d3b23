//! Axum HTTP API server.
//!
//! Accepts a multipart video upload, runs activity recognition and returns
//! the ranked activities as JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, PROCESSING_ERROR_MESSAGE};
pub use routes::create_router;
pub use state::AppState;
