//! In-memory service discovery repository.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::table::EntityTable;
use crate::error::Result;
use crate::models::{staleness_cutoff, ServiceInfo};
use crate::repository::ServiceDiscoveryRepository;

/// Registry of service instances in registration order.
///
/// Staleness is always judged against the wall clock at call time; a
/// heartbeat stamps the later of now and the stored `last_seen`.
#[derive(Debug)]
pub struct InMemoryServiceDiscoveryRepository {
    services: EntityTable<ServiceInfo>,
}

impl Default for InMemoryServiceDiscoveryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceDiscoveryRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "service_discovery_repository_initialized");
        Self {
            services: EntityTable::new(),
        }
    }
}

#[async_trait]
impl ServiceDiscoveryRepository for InMemoryServiceDiscoveryRepository {
    async fn register(&self, service: ServiceInfo) -> Result<ServiceInfo> {
        let service = self.services.insert(service).await;
        info!(
            service_id = %service.service_id,
            service_name = %service.service_name,
            host = %service.host,
            grpc_port = service.grpc_port,
            http_port = service.http_port,
            "service_registered"
        );
        Ok(service)
    }

    async fn deregister(&self, service_id: &str) -> Result<bool> {
        let removed = self.services.remove(service_id).await;
        if removed {
            info!(service_id, "service_deregistered");
        } else {
            warn!(service_id, "service_not_found_for_deregister");
        }
        Ok(removed)
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<ServiceInfo>> {
        let service = self.services.get(service_id).await;
        debug!(service_id, found = service.is_some(), "service_retrieved");
        Ok(service)
    }

    async fn get_service_by_name(&self, service_name: &str) -> Result<Option<ServiceInfo>> {
        let service = self
            .services
            .find(|s| s.service_name == service_name)
            .await;
        debug!(service_name, found = service.is_some(), "service_retrieved_by_name");
        Ok(service)
    }

    async fn list_services_by_name(&self, service_name: &str) -> Result<Vec<ServiceInfo>> {
        let found = self
            .services
            .filter(|s| s.service_name == service_name)
            .await;
        debug!(service_name, count = found.len(), "services_listed_by_name");
        Ok(found)
    }

    async fn list_all_services(&self) -> Result<Vec<ServiceInfo>> {
        let all = self.services.all().await;
        debug!(count = all.len(), "all_services_listed");
        Ok(all)
    }

    async fn update_heartbeat(&self, service_id: &str) -> Result<ServiceInfo> {
        let service = self
            .services
            .modify(service_id, |s| {
                s.last_seen = s.last_seen.max(Utc::now());
                Ok(())
            })
            .await
            .inspect_err(|_| warn!(service_id, "service_not_found_for_heartbeat"))?;
        debug!(service_id, last_seen = %service.last_seen, "service_heartbeat_updated");
        Ok(service)
    }

    async fn remove_stale_services(&self, threshold_seconds: u64) -> Result<usize> {
        let cutoff = staleness_cutoff(Utc::now(), threshold_seconds);
        let removed = self.services.remove_where(|s| s.last_seen < cutoff).await;
        if !removed.is_empty() {
            info!(
                count = removed.len(),
                threshold_seconds,
                service_ids = ?removed,
                "stale_services_removed"
            );
        }
        Ok(removed.len())
    }

    async fn is_service_healthy(&self, service_id: &str, threshold_seconds: u64) -> Result<bool> {
        let healthy = self
            .services
            .get(service_id)
            .await
            .is_some_and(|s| s.is_fresh(Utc::now(), threshold_seconds));
        debug!(service_id, threshold_seconds, healthy, "service_health_checked");
        Ok(healthy)
    }

    async fn get_service_count(&self) -> Result<usize> {
        Ok(self.services.len().await)
    }
}
