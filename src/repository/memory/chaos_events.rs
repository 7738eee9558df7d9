//! In-memory chaos events repository.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::table::EntityTable;
use crate::error::Result;
use crate::models::{ChaosEvent, EventStatus, EventType};
use crate::repository::aggregate::mean;
use crate::repository::ChaosEventsRepository;

#[derive(Debug)]
pub struct InMemoryChaosEventsRepository {
    events: EntityTable<ChaosEvent>,
}

impl Default for InMemoryChaosEventsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChaosEventsRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "chaos_events_repository_initialized");
        Self {
            events: EntityTable::new(),
        }
    }
}

#[async_trait]
impl ChaosEventsRepository for InMemoryChaosEventsRepository {
    async fn create(&self, event: ChaosEvent) -> Result<ChaosEvent> {
        let event = self.events.insert(event).await;
        debug!(
            event_id = %event.event_id,
            run_id = %event.run_id,
            event_type = %event.event_type,
            target_service = %event.target_service,
            "chaos_event_created"
        );
        Ok(event)
    }

    async fn get_by_id(&self, event_id: &str) -> Result<Option<ChaosEvent>> {
        let event = self.events.get(event_id).await;
        debug!(event_id, found = event.is_some(), "chaos_event_retrieved");
        Ok(event)
    }

    async fn update(&self, event: ChaosEvent) -> Result<ChaosEvent> {
        let event = self
            .events
            .replace(event)
            .await
            .inspect_err(|e| warn!(error = %e, "chaos_event_not_found_for_update"))?;
        debug!(event_id = %event.event_id, "chaos_event_updated");
        Ok(event)
    }

    async fn delete(&self, event_id: &str) -> Result<bool> {
        let deleted = self.events.remove(event_id).await;
        if deleted {
            debug!(event_id, "chaos_event_deleted");
        } else {
            warn!(event_id, "chaos_event_not_found_for_delete");
        }
        Ok(deleted)
    }

    async fn get_by_run(&self, run_id: &str) -> Result<Vec<ChaosEvent>> {
        let found = self.events.filter(|e| e.run_id == run_id).await;
        debug!(run_id, count = found.len(), "chaos_events_retrieved_by_run");
        Ok(found)
    }

    async fn get_by_type(&self, event_type: EventType) -> Result<Vec<ChaosEvent>> {
        let found = self.events.filter(|e| e.event_type == event_type).await;
        debug!(%event_type, count = found.len(), "chaos_events_retrieved_by_type");
        Ok(found)
    }

    async fn get_by_service(&self, service_name: &str) -> Result<Vec<ChaosEvent>> {
        let found = self
            .events
            .filter(|e| e.target_service == service_name)
            .await;
        debug!(service_name, count = found.len(), "chaos_events_retrieved_by_service");
        Ok(found)
    }

    async fn update_status(&self, event_id: &str, status: EventStatus) -> Result<ChaosEvent> {
        let event = self
            .events
            .modify(event_id, |e| {
                e.status = status;
                Ok(())
            })
            .await
            .inspect_err(|_| warn!(event_id, "chaos_event_not_found_for_status_update"))?;
        debug!(event_id, %status, "chaos_event_status_updated");
        Ok(event)
    }

    async fn record_recovery(&self, event_id: &str, recovery_time_ms: i64) -> Result<ChaosEvent> {
        let event = self
            .events
            .modify(event_id, |e| {
                e.recovery_time_ms = Some(recovery_time_ms);
                e.status = EventStatus::Recovered;
                Ok(())
            })
            .await
            .inspect_err(|_| warn!(event_id, "chaos_event_not_found_for_recovery"))?;
        info!(
            event_id,
            target_service = %event.target_service,
            recovery_time_ms,
            "chaos_event_recovery_recorded"
        );
        Ok(event)
    }

    async fn get_active_events(&self) -> Result<Vec<ChaosEvent>> {
        let found = self.events.filter(|e| e.status.is_active()).await;
        debug!(count = found.len(), "active_chaos_events_retrieved");
        Ok(found)
    }

    async fn calculate_average_recovery_time(&self, event_type: EventType) -> Result<f64> {
        let events = self.events.filter(|e| e.event_type == event_type).await;
        let average = mean(events.iter().filter_map(|e| e.recovery_time_ms));
        debug!(%event_type, average_ms = average, "chaos_event_average_recovery_calculated");
        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterError, EntityKind};
    use crate::models::Payload;

    fn event(id: &str, run_id: &str, event_type: EventType, target: &str) -> ChaosEvent {
        ChaosEvent::new(id, run_id, event_type, target, Payload::new())
    }

    #[tokio::test]
    async fn test_record_recovery_marks_recovered() {
        let repo = InMemoryChaosEventsRepository::new();
        repo.create(event("e1", "r1", EventType::ServiceKill, "market-data"))
            .await
            .unwrap();

        let recovered = repo.record_recovery("e1", 4200).await.unwrap();

        assert_eq!(recovered.status, EventStatus::Recovered);
        assert_eq!(recovered.recovery_time_ms, Some(4200));
        assert_eq!(repo.get_by_id("e1").await.unwrap(), Some(recovered));
    }

    #[tokio::test]
    async fn test_recovery_on_unknown_event_is_not_found() {
        let repo = InMemoryChaosEventsRepository::new();

        let err = repo.record_recovery("ghost", 10).await.unwrap_err();

        assert_eq!(err, AdapterError::not_found(EntityKind::ChaosEvent, "ghost"));
    }

    #[tokio::test]
    async fn test_active_events_are_injected_or_in_progress() {
        let repo = InMemoryChaosEventsRepository::new();
        repo.create(event("e1", "r1", EventType::CpuStress, "a")).await.unwrap();
        repo.create(event("e2", "r1", EventType::CpuStress, "b").with_status(EventStatus::Injected))
            .await
            .unwrap();
        repo.create(event("e3", "r1", EventType::CpuStress, "c").with_status(EventStatus::InProgress))
            .await
            .unwrap();
        repo.update_status("e3", EventStatus::Failed).await.unwrap();

        let active = repo.get_active_events().await.unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].event_id, "e2");
    }

    #[tokio::test]
    async fn test_average_recovery_ignores_unrecovered_events() {
        let repo = InMemoryChaosEventsRepository::new();
        for id in ["e1", "e2", "e3"] {
            repo.create(event(id, "r1", EventType::NetworkPartition, "gw")).await.unwrap();
        }
        repo.create(event("other", "r1", EventType::ClockSkew, "gw")).await.unwrap();
        repo.record_recovery("e1", 1000).await.unwrap();
        repo.record_recovery("e2", 3000).await.unwrap();
        repo.record_recovery("other", 99_000).await.unwrap();

        let average = repo
            .calculate_average_recovery_time(EventType::NetworkPartition)
            .await
            .unwrap();

        assert_eq!(average, 2000.0);
        assert_eq!(
            repo.calculate_average_recovery_time(EventType::MemoryStress).await.unwrap(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_queries_by_run_type_and_service() {
        let repo = InMemoryChaosEventsRepository::new();
        repo.create(event("e1", "r1", EventType::ServiceRestart, "risk")).await.unwrap();
        repo.create(event("e2", "r2", EventType::NetworkLatency, "risk")).await.unwrap();
        repo.create(event("e3", "r2", EventType::ServiceRestart, "audit")).await.unwrap();

        assert_eq!(repo.get_by_run("r2").await.unwrap().len(), 2);
        assert_eq!(repo.get_by_type(EventType::ServiceRestart).await.unwrap().len(), 2);
        assert_eq!(repo.get_by_service("risk").await.unwrap().len(), 2);
        assert!(repo.delete("e2").await.unwrap());
        assert_eq!(repo.get_by_service("risk").await.unwrap().len(), 1);
    }
}
