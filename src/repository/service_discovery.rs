use async_trait::async_trait;

use crate::error::Result;
use crate::models::ServiceInfo;

/// Registry of live service instances keyed by service id.
#[async_trait]
pub trait ServiceDiscoveryRepository: Send + Sync {
    /// Registers or replaces the instance with the same id.
    async fn register(&self, service: ServiceInfo) -> Result<ServiceInfo>;

    async fn deregister(&self, service_id: &str) -> Result<bool>;

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<ServiceInfo>>;

    /// First registered instance with this name.
    async fn get_service_by_name(&self, service_name: &str) -> Result<Option<ServiceInfo>>;

    async fn list_services_by_name(&self, service_name: &str) -> Result<Vec<ServiceInfo>>;

    async fn list_all_services(&self) -> Result<Vec<ServiceInfo>>;

    /// Sets `last_seen` to now; `NotFound` if the id is not registered.
    async fn update_heartbeat(&self, service_id: &str) -> Result<ServiceInfo>;

    /// Removes every service whose `last_seen` is older than now - threshold.
    async fn remove_stale_services(&self, threshold_seconds: u64) -> Result<usize>;

    /// False for unknown ids.
    async fn is_service_healthy(&self, service_id: &str, threshold_seconds: u64) -> Result<bool>;

    async fn get_service_count(&self) -> Result<usize>;
}
