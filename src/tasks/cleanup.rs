//! Cache Expiry Sweep
//!
//! Periodically purges expired cache entries so memory is reclaimed even for
//! keys nobody reads again. Reads already treat expired entries as absent;
//! this task only changes when they are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::repository::memory::InMemoryCacheRepository;

/// Spawns the sweep loop, running every `interval_secs` seconds.
///
/// Abort the returned handle to stop it. An interval of zero is clamped to
/// one second.
pub fn spawn_cache_sweep_task(
    cache: Arc<InMemoryCacheRepository>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "cache_sweep_task_started");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(removed, "cache_expired_entries_purged");
            } else {
                debug!("cache_sweep_found_nothing");
            }
        }
    })
}
