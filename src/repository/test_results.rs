use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AssertionType, ResultStatus, TestResult};
use crate::repository::AssertionStatistics;

/// Storage for assertion results.
#[async_trait]
pub trait TestResultsRepository: Send + Sync {
    async fn create(&self, result: TestResult) -> Result<TestResult>;

    async fn get_by_id(&self, result_id: &str) -> Result<Option<TestResult>>;

    async fn update(&self, result: TestResult) -> Result<TestResult>;

    async fn delete(&self, result_id: &str) -> Result<bool>;

    async fn get_by_run(&self, run_id: &str) -> Result<Vec<TestResult>>;

    async fn get_by_assertion_type(&self, assertion_type: AssertionType) -> Result<Vec<TestResult>>;

    async fn get_by_status(&self, status: ResultStatus) -> Result<Vec<TestResult>>;

    async fn get_failed_results(&self, run_id: &str) -> Result<Vec<TestResult>>;

    async fn get_by_correlation_id(&self, correlation_id: &str) -> Result<Vec<TestResult>>;

    /// Passed results over all results of the run.
    async fn calculate_pass_rate(&self, run_id: &str) -> Result<f64>;

    async fn count_by_status(&self, run_id: &str, status: ResultStatus) -> Result<usize>;

    async fn get_assertion_statistics(
        &self,
        assertion_type: AssertionType,
    ) -> Result<AssertionStatistics>;

    /// Inserts in order as repeated `create` would; later duplicates win.
    async fn bulk_create(&self, results: Vec<TestResult>) -> Result<Vec<TestResult>>;
}
