//! Stale Service Reaper
//!
//! Periodically evicts registrations whose heartbeat is older than the
//! configured threshold.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::repository::ServiceDiscoveryRepository;

/// Spawns the reaper loop, running `remove_stale_services(threshold_secs)`
/// every `interval_secs` seconds.
pub fn spawn_stale_service_reaper(
    services: Arc<dyn ServiceDiscoveryRepository>,
    interval_secs: u64,
    threshold_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            threshold_secs,
            "stale_service_reaper_started"
        );

        loop {
            tokio::time::sleep(interval).await;

            match services.remove_stale_services(threshold_secs).await {
                Ok(0) => debug!("stale_service_reaper_found_nothing"),
                Ok(removed) => info!(removed, "stale_service_reaper_evicted"),
                Err(e) => error!(error = %e, "stale_service_reaper_failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceInfo;
    use crate::repository::memory::InMemoryServiceDiscoveryRepository;
    use chrono::Utc;

    #[tokio::test]
    async fn test_reaper_evicts_only_stale_services() {
        let services: Arc<dyn ServiceDiscoveryRepository> =
            Arc::new(InMemoryServiceDiscoveryRepository::new());
        let stale = ServiceInfo::new("old", "gw", "1.0.0", "localhost", 50051, 8080)
            .with_last_seen(Utc::now() - chrono::Duration::seconds(600));
        let fresh = ServiceInfo::new("new", "gw", "1.0.0", "localhost", 50052, 8081);
        services.register(stale).await.unwrap();
        services.register(fresh).await.unwrap();

        let handle = spawn_stale_service_reaper(services.clone(), 1, 300);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.abort();

        assert_eq!(services.get_service_by_id("old").await.unwrap(), None);
        assert!(services.get_service_by_id("new").await.unwrap().is_some());
    }
}
