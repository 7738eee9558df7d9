//! In-memory scenarios repository.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::table::EntityTable;
use crate::error::Result;
use crate::models::{Scenario, ScenarioStatus, ScenarioType};
use crate::repository::ScenariosRepository;

#[derive(Debug)]
pub struct InMemoryScenariosRepository {
    scenarios: EntityTable<Scenario>,
}

impl Default for InMemoryScenariosRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScenariosRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "scenarios_repository_initialized");
        Self {
            scenarios: EntityTable::new(),
        }
    }
}

#[async_trait]
impl ScenariosRepository for InMemoryScenariosRepository {
    async fn create(&self, scenario: Scenario) -> Result<Scenario> {
        let scenario = self.scenarios.insert(scenario).await;
        debug!(
            scenario_id = %scenario.scenario_id,
            scenario_type = %scenario.scenario_type,
            "scenario_created"
        );
        Ok(scenario)
    }

    async fn get_by_id(&self, scenario_id: &str) -> Result<Option<Scenario>> {
        let scenario = self.scenarios.get(scenario_id).await;
        debug!(scenario_id, found = scenario.is_some(), "scenario_retrieved");
        Ok(scenario)
    }

    async fn update(&self, scenario: Scenario) -> Result<Scenario> {
        let scenario = self.scenarios.replace(scenario).await.inspect_err(|e| {
            warn!(error = %e, "scenario_not_found_for_update");
        })?;
        debug!(scenario_id = %scenario.scenario_id, "scenario_updated");
        Ok(scenario)
    }

    async fn delete(&self, scenario_id: &str) -> Result<bool> {
        let deleted = self.scenarios.remove(scenario_id).await;
        if deleted {
            debug!(scenario_id, "scenario_deleted");
        } else {
            warn!(scenario_id, "scenario_not_found_for_delete");
        }
        Ok(deleted)
    }

    async fn list_all(&self, limit: usize, offset: usize) -> Result<Vec<Scenario>> {
        let page = self.scenarios.page(limit, offset).await;
        debug!(limit, offset, returned = page.len(), "scenarios_listed");
        Ok(page)
    }

    async fn get_by_type(&self, scenario_type: ScenarioType) -> Result<Vec<Scenario>> {
        let found = self
            .scenarios
            .filter(|s| s.scenario_type == scenario_type)
            .await;
        debug!(%scenario_type, count = found.len(), "scenarios_retrieved_by_type");
        Ok(found)
    }

    async fn get_by_status(&self, status: ScenarioStatus) -> Result<Vec<Scenario>> {
        let found = self.scenarios.filter(|s| s.status == status).await;
        debug!(%status, count = found.len(), "scenarios_retrieved_by_status");
        Ok(found)
    }

    async fn update_status(&self, scenario_id: &str, status: ScenarioStatus) -> Result<Scenario> {
        let scenario = self
            .scenarios
            .modify(scenario_id, |s| {
                s.status = status;
                s.updated_at = Utc::now();
                Ok(())
            })
            .await
            .inspect_err(|_| warn!(scenario_id, "scenario_not_found_for_status_update"))?;
        debug!(scenario_id, %status, "scenario_status_updated");
        Ok(scenario)
    }

    async fn search_by_tag(&self, tag: &str) -> Result<Vec<Scenario>> {
        let found = self.scenarios.filter(|s| s.has_tag(tag)).await;
        debug!(tag, count = found.len(), "scenarios_searched_by_tag");
        Ok(found)
    }

    async fn get_active_scenarios(&self) -> Result<Vec<Scenario>> {
        self.get_by_status(ScenarioStatus::Active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterError, EntityKind};
    use crate::models::Payload;
    use serde_json::json;

    fn scenario(id: &str, scenario_type: ScenarioType) -> Scenario {
        Scenario::new(id, format!("scenario {id}"), scenario_type, Payload::new())
    }

    #[tokio::test]
    async fn test_create_and_retrieve_scenario() {
        let repo = InMemoryScenariosRepository::new();
        let mut configuration = Payload::new();
        configuration.insert("timeout".to_string(), json!(30));
        let scenario = Scenario::new(
            "test-001",
            "Service Restart Test",
            ScenarioType::ServiceRestart,
            configuration,
        )
        .with_status(ScenarioStatus::Active)
        .with_services(["trading-engine"]);

        let created = repo.create(scenario.clone()).await.unwrap();
        let retrieved = repo.get_by_id("test-001").await.unwrap();

        assert_eq!(created, scenario);
        assert_eq!(retrieved, Some(scenario));
        assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_overwrites_existing_id() {
        let repo = InMemoryScenariosRepository::new();
        repo.create(scenario("s1", ScenarioType::ServiceRestart)).await.unwrap();
        repo.create(scenario("s1", ScenarioType::DataCorruption)).await.unwrap();

        let stored = repo.get_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.scenario_type, ScenarioType::DataCorruption);
        assert_eq!(repo.list_all(100, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = InMemoryScenariosRepository::new();

        let err = repo.update(scenario("ghost", ScenarioType::Combined)).await.unwrap_err();

        assert_eq!(err, AdapterError::not_found(EntityKind::Scenario, "ghost"));
        assert_eq!(repo.get_by_id("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_by_type() {
        let repo = InMemoryScenariosRepository::new();
        repo.create(scenario("s1", ScenarioType::ServiceRestart)).await.unwrap();
        repo.create(scenario("s2", ScenarioType::NetworkLatency)).await.unwrap();

        let results = repo.get_by_type(ScenarioType::ServiceRestart).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scenario_id, "s1");
    }

    #[tokio::test]
    async fn test_status_update_and_active_query() {
        let repo = InMemoryScenariosRepository::new();
        repo.create(scenario("s1", ScenarioType::Combined)).await.unwrap();
        repo.create(scenario("s2", ScenarioType::Combined)).await.unwrap();

        let updated = repo.update_status("s2", ScenarioStatus::Active).await.unwrap();
        assert_eq!(updated.status, ScenarioStatus::Active);

        let active = repo.get_active_scenarios().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].scenario_id, "s2");

        assert!(matches!(
            repo.update_status("ghost", ScenarioStatus::Archived).await,
            Err(AdapterError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_by_tag_and_delete() {
        let repo = InMemoryScenariosRepository::new();
        repo.create(scenario("s1", ScenarioType::Combined).with_tags(["smoke", "nightly"]))
            .await
            .unwrap();
        repo.create(scenario("s2", ScenarioType::Combined).with_tags(["nightly"]))
            .await
            .unwrap();

        assert_eq!(repo.search_by_tag("nightly").await.unwrap().len(), 2);
        assert_eq!(repo.search_by_tag("smoke").await.unwrap().len(), 1);
        assert!(repo.search_by_tag("night").await.unwrap().is_empty());

        assert!(repo.delete("s1").await.unwrap());
        assert!(!repo.delete("s1").await.unwrap());
        assert_eq!(repo.search_by_tag("smoke").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_list_all_paginates_in_insertion_order() {
        let repo = InMemoryScenariosRepository::new();
        for i in 0..5 {
            repo.create(scenario(&format!("s{i}"), ScenarioType::Combined)).await.unwrap();
        }

        let ids: Vec<String> = repo
            .list_all(2, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.scenario_id)
            .collect();

        assert_eq!(ids, vec!["s2", "s3"]);
    }
}
