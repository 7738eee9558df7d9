//! Scenario Model
//!
//! Test scenario definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Payload;

string_enum! {
    /// Kind of chaos a scenario exercises.
    ScenarioType {
        ServiceRestart => "service_restart",
        NetworkPartition => "network_partition",
        NetworkLatency => "network_latency",
        ResourceExhaustion => "resource_exhaustion",
        DataCorruption => "data_corruption",
        Combined => "combined",
    }
}

string_enum! {
    /// Scenario lifecycle status.
    ScenarioStatus {
        Draft => "draft",
        Active => "active",
        Archived => "archived",
        Deprecated => "deprecated",
    }
}

impl Default for ScenarioStatus {
    fn default() -> Self {
        ScenarioStatus::Draft
    }
}

// == Scenario ==
/// A test scenario definition with its chaos configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub status: ScenarioStatus,
    pub configuration: Payload,
    #[serde(default)]
    pub services_under_test: Vec<String>,
    #[serde(default)]
    pub expected_outcomes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    /// Creates a draft scenario with empty lists and fresh timestamps.
    pub fn new(
        scenario_id: impl Into<String>,
        name: impl Into<String>,
        scenario_type: ScenarioType,
        configuration: Payload,
    ) -> Self {
        let now = Utc::now();
        Self {
            scenario_id: scenario_id.into(),
            name: name.into(),
            description: None,
            scenario_type,
            status: ScenarioStatus::Draft,
            configuration,
            services_under_test: Vec::new(),
            expected_outcomes: Vec::new(),
            tags: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ScenarioStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the services under test.
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services_under_test = services.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `tag` is one of this scenario's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
