//! In-memory repository backends.
//!
//! Each store guards its own state with a single tokio `RwLock`, so
//! operations on one record kind never contend with another.

mod cache;
mod chaos_events;
mod scenarios;
mod service_discovery;
mod table;
mod test_results;
mod test_runs;

pub use cache::InMemoryCacheRepository;
pub use chaos_events::InMemoryChaosEventsRepository;
pub use scenarios::InMemoryScenariosRepository;
pub use service_discovery::InMemoryServiceDiscoveryRepository;
pub use test_results::InMemoryTestResultsRepository;
pub use test_runs::InMemoryTestRunsRepository;
