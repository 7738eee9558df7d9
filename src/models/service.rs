//! Service Registration Model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Payload;

// == Service Info ==
/// A registered service instance and its last heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service_id: String,
    pub service_name: String,
    pub version: String,
    pub host: String,
    pub grpc_port: u16,
    pub http_port: u16,
    /// Never moves backwards across heartbeats
    pub last_seen: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Payload,
}

impl ServiceInfo {
    /// Creates a registration seen and registered now.
    pub fn new(
        service_id: impl Into<String>,
        service_name: impl Into<String>,
        version: impl Into<String>,
        host: impl Into<String>,
        grpc_port: u16,
        http_port: u16,
    ) -> Self {
        let now = Utc::now();
        Self {
            service_id: service_id.into(),
            service_name: service_name.into(),
            version: version.into(),
            host: host.into(),
            grpc_port,
            http_port,
            last_seen: now,
            registered_at: now,
            metadata: Payload::new(),
        }
    }

    /// Sets `last_seen`.
    pub fn with_last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = last_seen;
        self
    }

    /// Healthy iff `last_seen >= now - threshold`.
    pub fn is_fresh(&self, now: DateTime<Utc>, threshold_seconds: u64) -> bool {
        self.last_seen >= staleness_cutoff(now, threshold_seconds)
    }
}

/// The oldest `last_seen` still considered fresh at `now`.
pub(crate) fn staleness_cutoff(now: DateTime<Utc>, threshold_seconds: u64) -> DateTime<Utc> {
    let threshold = i64::try_from(threshold_seconds).unwrap_or(i64::MAX);
    Duration::try_seconds(threshold)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
