use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChaosEvent, EventStatus, EventType};

/// Storage for chaos injection events.
#[async_trait]
pub trait ChaosEventsRepository: Send + Sync {
    async fn create(&self, event: ChaosEvent) -> Result<ChaosEvent>;

    async fn get_by_id(&self, event_id: &str) -> Result<Option<ChaosEvent>>;

    async fn update(&self, event: ChaosEvent) -> Result<ChaosEvent>;

    async fn delete(&self, event_id: &str) -> Result<bool>;

    async fn get_by_run(&self, run_id: &str) -> Result<Vec<ChaosEvent>>;

    async fn get_by_type(&self, event_type: EventType) -> Result<Vec<ChaosEvent>>;

    async fn get_by_service(&self, service_name: &str) -> Result<Vec<ChaosEvent>>;

    async fn update_status(&self, event_id: &str, status: EventStatus) -> Result<ChaosEvent>;

    /// Stores the recovery time and marks the event `recovered`.
    async fn record_recovery(&self, event_id: &str, recovery_time_ms: i64) -> Result<ChaosEvent>;

    /// Events currently injected or in progress.
    async fn get_active_events(&self) -> Result<Vec<ChaosEvent>>;

    async fn calculate_average_recovery_time(&self, event_type: EventType) -> Result<f64>;
}
