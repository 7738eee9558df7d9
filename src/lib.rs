//! Coordinator Store - persistence layer for a chaos test coordinator
//!
//! A TTL key/value cache and repositories for scenarios, test runs, chaos
//! events, test results and service registrations, resolved through an
//! [`AdapterFactory`].

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use config::AdapterConfig;
pub use error::{AdapterError, EntityKind, Result};
pub use factory::{AdapterFactory, HealthReport, RepositoryKind, ResourceHealth};
pub use tasks::{spawn_cache_sweep_task, spawn_stale_service_reaper};
