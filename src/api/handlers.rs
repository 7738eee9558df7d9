//! API Handlers
//!
//! Read-only diagnostics over the factory's stores.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AdapterError, EntityKind, Result};
use crate::factory::AdapterFactory;
use crate::models::ServiceInfo;

use super::responses::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<AdapterFactory>,
}

impl AppState {
    pub fn new(factory: Arc<AdapterFactory>) -> Self {
        Self { factory }
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.factory.health_check().await;
    Json(HealthResponse::from_report(report))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let cache = state.factory.in_memory_cache().stats().await;
    let registered_services = state
        .factory
        .service_discovery(true)
        .await
        .get_service_count()
        .await?;

    Ok(Json(StatsResponse {
        cache: cache.into(),
        registered_services,
    }))
}

/// Handler for GET /services
pub async fn list_services_handler(State(state): State<AppState>) -> Result<Json<Vec<ServiceInfo>>> {
    let services = state
        .factory
        .service_discovery(true)
        .await
        .list_all_services()
        .await?;
    Ok(Json(services))
}

/// Handler for GET /services/:service_id
pub async fn get_service_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<Json<ServiceInfo>> {
    state
        .factory
        .service_discovery(true)
        .await
        .get_service_by_id(&service_id)
        .await?
        .map(Json)
        .ok_or_else(|| AdapterError::not_found(EntityKind::Service, service_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(Arc::new(AdapterFactory::default()))
    }

    #[tokio::test]
    async fn test_stats_handler_reports_cache_counters() {
        let state = test_state();
        let cache = state.factory.cache(true).await;
        cache.set("k", json!(1), None).await.unwrap();
        cache.get("k").await.unwrap();
        cache.get("missing").await.unwrap();

        let Json(stats) = stats_handler(State(state)).await.unwrap();

        assert_eq!(stats.cache.hits, 1);
        assert_eq!(stats.cache.misses, 1);
        assert_eq!(stats.cache.total_entries, 1);
        assert_eq!(stats.registered_services, 0);
    }

    #[tokio::test]
    async fn test_health_handler_uninitialized_is_degraded() {
        let Json(health) = health_handler(State(test_state())).await;

        assert_eq!(health.status, "degraded");
        assert!(!health.factory_initialized);
    }

    #[tokio::test]
    async fn test_get_unknown_service_is_not_found() {
        let err = get_service_handler(State(test_state()), Path("ghost".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err, AdapterError::not_found(EntityKind::Service, "ghost"));
    }
}
