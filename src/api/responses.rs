//! Response DTOs for the admin API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::factory::{HealthReport, ResourceHealth};

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every external resource answered, else `degraded`
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub factory_initialized: bool,
    pub relational: ResourceHealth,
    pub cache: ResourceHealth,
}

impl HealthResponse {
    pub fn from_report(report: HealthReport) -> Self {
        let healthy =
            report.factory_initialized && report.relational.connected && report.cache.connected;
        Self {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            factory_initialized: report.factory_initialized,
            relational: report.relational,
            cache: report.cache,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStatsBody,
    /// Registered service instances, stale or not
    pub registered_services: usize,
}

/// Cache counters plus the derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            total_entries: stats.total_entries,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
