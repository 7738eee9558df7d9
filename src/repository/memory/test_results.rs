//! In-memory test results repository.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::table::EntityTable;
use crate::error::Result;
use crate::models::{AssertionType, ResultStatus, TestResult};
use crate::repository::aggregate::{ratio, AssertionStatistics};
use crate::repository::TestResultsRepository;

#[derive(Debug)]
pub struct InMemoryTestResultsRepository {
    results: EntityTable<TestResult>,
}

impl Default for InMemoryTestResultsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTestResultsRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "test_results_repository_initialized");
        Self {
            results: EntityTable::new(),
        }
    }
}

#[async_trait]
impl TestResultsRepository for InMemoryTestResultsRepository {
    async fn create(&self, result: TestResult) -> Result<TestResult> {
        let result = self.results.insert(result).await;
        debug!(
            result_id = %result.result_id,
            run_id = %result.run_id,
            assertion_type = %result.assertion_type,
            status = %result.status,
            "test_result_created"
        );
        Ok(result)
    }

    async fn get_by_id(&self, result_id: &str) -> Result<Option<TestResult>> {
        let result = self.results.get(result_id).await;
        debug!(result_id, found = result.is_some(), "test_result_retrieved");
        Ok(result)
    }

    async fn update(&self, result: TestResult) -> Result<TestResult> {
        let result = self
            .results
            .replace(result)
            .await
            .inspect_err(|e| warn!(error = %e, "test_result_not_found_for_update"))?;
        debug!(result_id = %result.result_id, "test_result_updated");
        Ok(result)
    }

    async fn delete(&self, result_id: &str) -> Result<bool> {
        let deleted = self.results.remove(result_id).await;
        if deleted {
            debug!(result_id, "test_result_deleted");
        } else {
            warn!(result_id, "test_result_not_found_for_delete");
        }
        Ok(deleted)
    }

    async fn get_by_run(&self, run_id: &str) -> Result<Vec<TestResult>> {
        let found = self.results.filter(|r| r.run_id == run_id).await;
        debug!(run_id, count = found.len(), "test_results_retrieved_by_run");
        Ok(found)
    }

    async fn get_by_assertion_type(&self, assertion_type: AssertionType) -> Result<Vec<TestResult>> {
        let found = self
            .results
            .filter(|r| r.assertion_type == assertion_type)
            .await;
        debug!(%assertion_type, count = found.len(), "test_results_retrieved_by_assertion_type");
        Ok(found)
    }

    async fn get_by_status(&self, status: ResultStatus) -> Result<Vec<TestResult>> {
        let found = self.results.filter(|r| r.status == status).await;
        debug!(%status, count = found.len(), "test_results_retrieved_by_status");
        Ok(found)
    }

    async fn get_failed_results(&self, run_id: &str) -> Result<Vec<TestResult>> {
        let found = self
            .results
            .filter(|r| r.run_id == run_id && r.status == ResultStatus::Failed)
            .await;
        debug!(run_id, count = found.len(), "failed_test_results_retrieved");
        Ok(found)
    }

    async fn get_by_correlation_id(&self, correlation_id: &str) -> Result<Vec<TestResult>> {
        let found = self
            .results
            .filter(|r| r.correlation_id.as_deref() == Some(correlation_id))
            .await;
        debug!(correlation_id, count = found.len(), "test_results_retrieved_by_correlation");
        Ok(found)
    }

    async fn calculate_pass_rate(&self, run_id: &str) -> Result<f64> {
        let results = self.results.filter(|r| r.run_id == run_id).await;
        let passed = results
            .iter()
            .filter(|r| r.status == ResultStatus::Passed)
            .count();
        let pass_rate = ratio(passed, results.len());
        debug!(run_id, total = results.len(), passed, pass_rate, "test_result_pass_rate_calculated");
        Ok(pass_rate)
    }

    async fn count_by_status(&self, run_id: &str, status: ResultStatus) -> Result<usize> {
        let count = self
            .results
            .count(|r| r.run_id == run_id && r.status == status)
            .await;
        debug!(run_id, %status, count, "test_results_counted_by_status");
        Ok(count)
    }

    async fn get_assertion_statistics(
        &self,
        assertion_type: AssertionType,
    ) -> Result<AssertionStatistics> {
        let results = self
            .results
            .filter(|r| r.assertion_type == assertion_type)
            .await;
        let count = |status: ResultStatus| results.iter().filter(|r| r.status == status).count();
        let stats = AssertionStatistics::new(
            results.len(),
            count(ResultStatus::Passed),
            count(ResultStatus::Failed),
            count(ResultStatus::Skipped),
        );
        debug!(
            %assertion_type,
            total = stats.total,
            passed = stats.passed,
            pass_rate = stats.pass_rate,
            "assertion_statistics_calculated"
        );
        Ok(stats)
    }

    async fn bulk_create(&self, results: Vec<TestResult>) -> Result<Vec<TestResult>> {
        let created = self.results.insert_all(results).await;
        info!(count = created.len(), "test_results_bulk_created");
        Ok(created)
    }
}
