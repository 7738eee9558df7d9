//! In-memory test runs repository.
//!
//! Status helpers (`update_status`, `start_run`, `complete_run`,
//! `record_completion`) refuse to move a run to a lower lifecycle rank.
//! Whole-record `update` replaces the stored run as given.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::table::EntityTable;
use crate::error::{AdapterError, EntityKind, Result};
use crate::models::{RunStatus, TestRun};
use crate::repository::aggregate::{mean, ratio};
use crate::repository::TestRunsRepository;

#[derive(Debug)]
pub struct InMemoryTestRunsRepository {
    runs: EntityTable<TestRun>,
}

impl Default for InMemoryTestRunsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTestRunsRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "test_runs_repository_initialized");
        Self {
            runs: EntityTable::new(),
        }
    }
}

fn transition(run: &mut TestRun, next: RunStatus) -> Result<()> {
    if !run.status.can_transition_to(next) {
        return Err(AdapterError::InvalidTransition {
            kind: EntityKind::TestRun,
            id: run.run_id.clone(),
            from: run.status.to_string(),
            to: next.to_string(),
        });
    }
    run.status = next;
    run.updated_at = Utc::now();
    Ok(())
}

#[async_trait]
impl TestRunsRepository for InMemoryTestRunsRepository {
    async fn create(&self, run: TestRun) -> Result<TestRun> {
        let run = self.runs.insert(run).await;
        debug!(run_id = %run.run_id, scenario_id = %run.scenario_id, "test_run_created");
        Ok(run)
    }

    async fn get_by_id(&self, run_id: &str) -> Result<Option<TestRun>> {
        let run = self.runs.get(run_id).await;
        debug!(run_id, found = run.is_some(), "test_run_retrieved");
        Ok(run)
    }

    async fn update(&self, run: TestRun) -> Result<TestRun> {
        let run = self
            .runs
            .replace(run)
            .await
            .inspect_err(|e| warn!(error = %e, "test_run_not_found_for_update"))?;
        debug!(run_id = %run.run_id, status = %run.status, "test_run_updated");
        Ok(run)
    }

    async fn delete(&self, run_id: &str) -> Result<bool> {
        let deleted = self.runs.remove(run_id).await;
        if deleted {
            debug!(run_id, "test_run_deleted");
        } else {
            warn!(run_id, "test_run_not_found_for_delete");
        }
        Ok(deleted)
    }

    async fn list_all(&self, limit: usize, offset: usize) -> Result<Vec<TestRun>> {
        let page = self.runs.page(limit, offset).await;
        debug!(limit, offset, returned = page.len(), "test_runs_listed");
        Ok(page)
    }

    async fn get_by_scenario(&self, scenario_id: &str) -> Result<Vec<TestRun>> {
        let found = self.runs.filter(|r| r.scenario_id == scenario_id).await;
        debug!(scenario_id, count = found.len(), "test_runs_retrieved_by_scenario");
        Ok(found)
    }

    async fn get_by_status(&self, status: RunStatus) -> Result<Vec<TestRun>> {
        let found = self.runs.filter(|r| r.status == status).await;
        debug!(%status, count = found.len(), "test_runs_retrieved_by_status");
        Ok(found)
    }

    async fn update_status(&self, run_id: &str, status: RunStatus) -> Result<TestRun> {
        let run = self
            .runs
            .modify(run_id, |run| transition(run, status))
            .await
            .inspect_err(|e| warn!(run_id, error = %e, "test_run_status_update_rejected"))?;
        debug!(run_id, %status, "test_run_status_updated");
        Ok(run)
    }

    async fn start_run(&self, run_id: &str) -> Result<TestRun> {
        let run = self
            .runs
            .modify(run_id, |run| {
                transition(run, RunStatus::Running)?;
                run.started_at = Some(run.updated_at);
                Ok(())
            })
            .await
            .inspect_err(|e| warn!(run_id, error = %e, "test_run_start_rejected"))?;
        info!(run_id, scenario_id = %run.scenario_id, "test_run_started");
        Ok(run)
    }

    async fn complete_run(
        &self,
        run_id: &str,
        status: RunStatus,
        exit_code: Option<i32>,
    ) -> Result<TestRun> {
        if !status.is_terminal() {
            warn!(run_id, %status, "test_run_completion_rejected");
            return Err(AdapterError::Validation(format!(
                "run {run_id} cannot complete with non-terminal status {status}"
            )));
        }
        let run = self
            .runs
            .modify(run_id, |run| {
                transition(run, status)?;
                let completed_at = run.updated_at;
                run.completed_at = Some(completed_at);
                run.exit_code = exit_code;
                if let Some(started_at) = run.started_at {
                    let elapsed = (completed_at - started_at).num_milliseconds();
                    run.duration_ms = Some(elapsed.max(0));
                }
                Ok(())
            })
            .await
            .inspect_err(|e| warn!(run_id, error = %e, "test_run_completion_rejected"))?;
        info!(
            run_id,
            %status,
            ?exit_code,
            duration_ms = ?run.duration_ms,
            "test_run_completed"
        );
        Ok(run)
    }

    async fn record_completion(
        &self,
        run_id: &str,
        exit_code: i32,
        duration_ms: i64,
    ) -> Result<TestRun> {
        let status = if exit_code == 0 {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        };
        let run = self
            .runs
            .modify(run_id, |run| {
                transition(run, status)?;
                run.completed_at = Some(run.updated_at);
                run.exit_code = Some(exit_code);
                run.duration_ms = Some(duration_ms);
                Ok(())
            })
            .await
            .inspect_err(|e| warn!(run_id, error = %e, "test_run_completion_rejected"))?;
        info!(run_id, %status, exit_code, duration_ms, "test_run_completion_recorded");
        Ok(run)
    }

    async fn get_recent_runs(&self, limit: usize) -> Result<Vec<TestRun>> {
        let mut runs = self.runs.all().await;
        // None orders below any timestamp, so never-started runs land last.
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit);
        debug!(limit, count = runs.len(), "recent_test_runs_retrieved");
        Ok(runs)
    }

    async fn get_failed_runs(&self, limit: usize) -> Result<Vec<TestRun>> {
        let mut runs = self.runs.filter(|r| r.status == RunStatus::Failed).await;
        runs.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        runs.truncate(limit);
        debug!(limit, count = runs.len(), "failed_test_runs_retrieved");
        Ok(runs)
    }

    async fn get_runs_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TestRun>> {
        let found = self
            .runs
            .filter(|r| r.started_at.is_some_and(|at| start <= at && at <= end))
            .await;
        debug!(%start, %end, count = found.len(), "test_runs_retrieved_by_date_range");
        Ok(found)
    }

    async fn calculate_pass_rate(&self, scenario_id: &str) -> Result<f64> {
        let runs = self.runs.filter(|r| r.scenario_id == scenario_id).await;
        let passed = runs.iter().filter(|r| r.status == RunStatus::Passed).count();
        let pass_rate = ratio(passed, runs.len());
        debug!(scenario_id, total = runs.len(), passed, pass_rate, "test_run_pass_rate_calculated");
        Ok(pass_rate)
    }

    async fn get_average_duration(&self, scenario_id: &str) -> Result<f64> {
        let runs = self.runs.filter(|r| r.scenario_id == scenario_id).await;
        let average = mean(runs.iter().filter_map(|r| r.duration_ms));
        debug!(scenario_id, average_ms = average, "test_run_average_duration_calculated");
        Ok(average)
    }
}
