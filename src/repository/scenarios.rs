use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Scenario, ScenarioStatus, ScenarioType};

/// Storage for scenario definitions.
#[async_trait]
pub trait ScenariosRepository: Send + Sync {
    async fn create(&self, scenario: Scenario) -> Result<Scenario>;

    async fn get_by_id(&self, scenario_id: &str) -> Result<Option<Scenario>>;

    /// Replaces a stored scenario; `NotFound` if the id was never created.
    async fn update(&self, scenario: Scenario) -> Result<Scenario>;

    async fn delete(&self, scenario_id: &str) -> Result<bool>;

    /// Slice of all scenarios in insertion order.
    async fn list_all(&self, limit: usize, offset: usize) -> Result<Vec<Scenario>>;

    async fn get_by_type(&self, scenario_type: ScenarioType) -> Result<Vec<Scenario>>;

    async fn get_by_status(&self, status: ScenarioStatus) -> Result<Vec<Scenario>>;

    async fn update_status(&self, scenario_id: &str, status: ScenarioStatus) -> Result<Scenario>;

    async fn search_by_tag(&self, tag: &str) -> Result<Vec<Scenario>>;

    async fn get_active_scenarios(&self) -> Result<Vec<Scenario>>;
}
