//! # bookpath-api
//!
//! HTTP API layer for BookPath built on Axum.
//!
//! Provides the auth and session endpoints, the guard middleware that runs a
//! [`GuardPipeline`](bookpath_auth::GuardPipeline) in front of protected
//! routes, extractors, DTOs, and the mapping from `AppError` to HTTP status.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
