//! HTTP API module for the sample and test resources plus health,
//! readiness, and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
