use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{RunStatus, TestRun};

/// Storage for test runs and their timing.
#[async_trait]
pub trait TestRunsRepository: Send + Sync {
    async fn create(&self, run: TestRun) -> Result<TestRun>;

    async fn get_by_id(&self, run_id: &str) -> Result<Option<TestRun>>;

    /// Replaces a stored run; `NotFound` if the id was never created.
    async fn update(&self, run: TestRun) -> Result<TestRun>;

    async fn delete(&self, run_id: &str) -> Result<bool>;

    /// Slice of all runs in insertion order.
    async fn list_all(&self, limit: usize, offset: usize) -> Result<Vec<TestRun>>;

    async fn get_by_scenario(&self, scenario_id: &str) -> Result<Vec<TestRun>>;

    async fn get_by_status(&self, status: RunStatus) -> Result<Vec<TestRun>>;

    async fn update_status(&self, run_id: &str, status: RunStatus) -> Result<TestRun>;

    /// Marks the run `running` and stamps `started_at`.
    async fn start_run(&self, run_id: &str) -> Result<TestRun>;

    /// Sets the final status, stamps `completed_at` and derives `duration_ms`
    /// from `started_at` when present.
    async fn complete_run(
        &self,
        run_id: &str,
        status: RunStatus,
        exit_code: Option<i32>,
    ) -> Result<TestRun>;

    /// Records an externally measured completion; exit code 0 means passed.
    async fn record_completion(
        &self,
        run_id: &str,
        exit_code: i32,
        duration_ms: i64,
    ) -> Result<TestRun>;

    /// Most recently started first; never-started runs last.
    async fn get_recent_runs(&self, limit: usize) -> Result<Vec<TestRun>>;

    /// Failed runs, most recently completed first.
    async fn get_failed_runs(&self, limit: usize) -> Result<Vec<TestRun>>;

    /// Runs whose `started_at` lies in `[start, end]`.
    async fn get_runs_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TestRun>>;

    async fn calculate_pass_rate(&self, scenario_id: &str) -> Result<f64>;

    /// Mean `duration_ms` over the scenario's runs that have one.
    async fn get_average_duration(&self, scenario_id: &str) -> Result<f64>;
}
