//! Test Result Model
//!
//! Outcome of a single assertion made during a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Kind of assertion verified.
    AssertionType {
        ServiceHealth => "service_health",
        ResponseTime => "response_time",
        DataConsistency => "data_consistency",
        AuditTrail => "audit_trail",
        ErrorRate => "error_rate",
        Throughput => "throughput",
        Latency => "latency",
        Availability => "availability",
        RecoveryTime => "recovery_time",
    }
}

string_enum! {
    /// Assertion outcome.
    ResultStatus {
        Passed => "passed",
        Failed => "failed",
        Skipped => "skipped",
        Error => "error",
    }
}

// == Test Result ==
/// A verified assertion with expected and actual values as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub result_id: String,
    pub run_id: String,
    pub assertion_type: AssertionType,
    pub expected_value: String,
    pub actual_value: String,
    pub status: ResultStatus,
    pub verification_time: DateTime<Utc>,
    #[serde(default)]
    pub error_details: Option<String>,
    /// Links to an external audit trail
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TestResult {
    /// Creates a result verified now.
    pub fn new(
        result_id: impl Into<String>,
        run_id: impl Into<String>,
        assertion_type: AssertionType,
        expected_value: impl Into<String>,
        actual_value: impl Into<String>,
        status: ResultStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            result_id: result_id.into(),
            run_id: run_id.into(),
            assertion_type,
            expected_value: expected_value.into(),
            actual_value: actual_value.into(),
            status,
            verification_time: now,
            error_details: None,
            correlation_id: None,
            created_at: now,
        }
    }

    /// Sets the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}
