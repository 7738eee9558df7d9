//! Chaos Event Model
//!
//! Records a single chaos injection and its recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Payload;

string_enum! {
    /// Kind of chaos injected.
    EventType {
        ServiceRestart => "service_restart",
        ServiceKill => "service_kill",
        NetworkPartition => "network_partition",
        NetworkLatency => "network_latency",
        NetworkPacketLoss => "network_packet_loss",
        CpuStress => "cpu_stress",
        MemoryStress => "memory_stress",
        DiskIoStress => "disk_io_stress",
        ClockSkew => "clock_skew",
    }
}

string_enum! {
    /// Chaos event lifecycle status.
    EventStatus {
        Pending => "pending",
        Injected => "injected",
        InProgress => "in_progress",
        Recovered => "recovered",
        Failed => "failed",
    }
}

impl EventStatus {
    /// Injected or still in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, EventStatus::Injected | EventStatus::InProgress)
    }
}

// == Chaos Event ==
/// A chaos injection event with recovery metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosEvent {
    pub event_id: String,
    pub run_id: String,
    pub event_type: EventType,
    pub target_service: String,
    pub parameters: Payload,
    pub injected_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    pub status: EventStatus,
    /// Set once the event reaches `recovered`
    #[serde(default)]
    pub recovery_time_ms: Option<i64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChaosEvent {
    /// Creates a pending event injected now.
    pub fn new(
        event_id: impl Into<String>,
        run_id: impl Into<String>,
        event_type: EventType,
        target_service: impl Into<String>,
        parameters: Payload,
    ) -> Self {
        let now = Utc::now();
        Self {
            event_id: event_id.into(),
            run_id: run_id.into(),
            event_type,
            target_service: target_service.into(),
            parameters,
            injected_at: now,
            duration_ms: None,
            status: EventStatus::Pending,
            recovery_time_ms: None,
            created_at: now,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }
}
