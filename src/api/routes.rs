//! API Routes
//!
//! Configures the Axum router for the admin endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_service_handler, health_handler, list_services_handler, stats_handler, AppState,
};

/// Creates the admin router.
///
/// # Endpoints
/// - `GET /health` - Factory and external resource reachability
/// - `GET /stats` - Cache counters and registered service count
/// - `GET /services` - Every registered service instance
/// - `GET /services/:service_id` - One registration, 404 if unknown
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/services", get(list_services_handler))
        .route("/services/:service_id", get(get_service_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
