//! Repository contracts
//!
//! One async trait per record kind plus the key/value cache. Every backend
//! (the in-memory stores in [`memory`] today, external stores later) must honor
//! the same pre- and post-conditions:
//!
//! - reads by id return `None` for an absent id, never an error
//! - writes and status helpers on an absent id fail with `NotFound`
//! - `create` overwrites an existing id without error
//! - aggregations over an empty scope return their zero value

pub mod aggregate;
pub mod memory;

mod cache;
mod chaos_events;
mod scenarios;
mod service_discovery;
mod test_results;
mod test_runs;

pub use aggregate::AssertionStatistics;
pub use cache::CacheRepository;
pub use chaos_events::ChaosEventsRepository;
pub use scenarios::ScenariosRepository;
pub use service_discovery::ServiceDiscoveryRepository;
pub use test_results::TestResultsRepository;
pub use test_runs::TestRunsRepository;
