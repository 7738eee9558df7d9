//! Background Tasks Module
//!
//! Optional maintenance loops over the in-memory stores. Both call the same
//! sweep the stores already run lazily, so disabling them changes memory
//! usage, never results.

mod cleanup;
mod reaper;

pub use cleanup::spawn_cache_sweep_task;
pub use reaper::spawn_stale_service_reaper;
