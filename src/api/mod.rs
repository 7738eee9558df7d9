//! Admin API Module
//!
//! A small diagnostic HTTP surface for the binary. The repository contracts
//! do not depend on it.

pub mod handlers;
pub mod responses;
pub mod routes;

pub use handlers::*;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
pub use routes::create_router;
