//! Test Run Model
//!
//! Tracks a single execution of a scenario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Payload;

string_enum! {
    /// Test run execution status.
    RunStatus {
        Pending => "pending",
        Running => "running",
        Passed => "passed",
        Failed => "failed",
        Error => "error",
        Cancelled => "cancelled",
        Timeout => "timeout",
    }
}

impl RunStatus {
    /// Position in the run lifecycle; status helpers never move to a lower rank.
    pub fn rank(&self) -> u8 {
        match self {
            RunStatus::Pending => 0,
            RunStatus::Running => 1,
            _ => 2,
        }
    }

    /// Whether the run has finished.
    pub fn is_terminal(&self) -> bool {
        self.rank() == 2
    }

    /// Whether a status helper may move a run from `self` to `next`.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        next.rank() >= self.rank()
    }
}

// == Test Run ==
/// A test execution run with timing and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub run_id: String,
    /// Scenario being executed, not enforced as a foreign key
    pub scenario_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Only meaningful once both timestamps are set
    #[serde(default)]
    pub duration_ms: Option<i64>,
    pub configuration_snapshot: Payload,
    #[serde(default)]
    pub test_environment: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl TestRun {
    /// Creates a pending run for `scenario_id`.
    pub fn new(
        run_id: impl Into<String>,
        scenario_id: impl Into<String>,
        configuration_snapshot: Payload,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id: run_id.into(),
            scenario_id: scenario_id.into(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            configuration_snapshot,
            test_environment: None,
            exit_code: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults_to_pending() {
        let run = TestRun::new("run-001", "scen-001", Payload::new());
        assert_eq!(run.status, RunStatus::Pending);
        assert!(run.started_at.is_none());
        assert!(run.duration_ms.is_none());
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Running));
        assert!(RunStatus::Running.can_transition_to(RunStatus::Passed));
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Cancelled));
        assert!(RunStatus::Failed.can_transition_to(RunStatus::Error));
        assert!(!RunStatus::Running.can_transition_to(RunStatus::Pending));
        assert!(!RunStatus::Timeout.can_transition_to(RunStatus::Running));
    }

    #[test]
    fn test_run_status_round_trips_through_str() {
        for status in RunStatus::ALL {
            assert_eq!(status.as_str().parse::<RunStatus>().unwrap(), *status);
        }
        assert!("paused".parse::<RunStatus>().is_err());
    }
}
