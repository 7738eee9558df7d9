//! Repository contract tests
//!
//! Exercises the repositories through the trait objects the factory hands
//! out, the way a coordinator would use them.

use std::time::Duration;

use chrono::Utc;
use coordinator_store::models::{
    AssertionType, ChaosEvent, EventStatus, EventType, Payload, ResultStatus, RunStatus, Scenario,
    ScenarioStatus, ScenarioType, ServiceInfo, TestResult, TestRun,
};
use coordinator_store::{AdapterError, AdapterFactory, EntityKind};
use serde_json::json;

// == Cache ==

#[tokio::test]
async fn test_cache_entry_expires_without_delete() {
    let factory = AdapterFactory::default();
    let cache = factory.cache(true).await;

    cache.set("lock:run-1", json!("held"), Some(1)).await.unwrap();
    assert!(cache.exists("lock:run-1").await.unwrap());
    assert!(cache.get_ttl("lock:run-1").await.unwrap().unwrap() <= 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(!cache.exists("lock:run-1").await.unwrap());
    assert_eq!(cache.get_ttl("lock:run-1").await.unwrap(), None);
    assert!(!cache.expire("lock:run-1", 60).await.unwrap());
}

#[tokio::test]
async fn test_cache_counters_and_patterns() {
    let factory = AdapterFactory::default();
    let cache = factory.cache(true).await;

    assert_eq!(cache.increment("runs:started", 5).await.unwrap(), 5);
    assert_eq!(cache.decrement("runs:started", 5).await.unwrap(), 0);
    cache.set("runs:label", json!("x"), None).await.unwrap();

    assert_eq!(
        cache.keys("runs:*").await.unwrap(),
        vec!["runs:label", "runs:started"]
    );
    assert!(matches!(
        cache.increment("runs:label", 1).await,
        Err(AdapterError::TypeMismatch(_))
    ));
    assert_eq!(cache.delete_pattern("runs:*").await.unwrap(), 2);
}

#[tokio::test]
async fn test_structured_values_round_trip() {
    let factory = AdapterFactory::default();
    let cache = factory.cache(true).await;
    let summary = json!({
        "scenario": "failover",
        "passed": true,
        "latencies": [12, 18.5, null],
        "by_service": {"gateway": {"errors": 0}}
    });

    cache.set_structured("summary:run-1", summary.clone(), None).await.unwrap();

    assert_eq!(cache.get_structured("summary:run-1").await.unwrap(), Some(summary));
}

// == Scenario and Run Lifecycle ==

#[tokio::test]
async fn test_run_lifecycle_through_factory() {
    let factory = AdapterFactory::default();
    let scenarios = factory.scenarios(true).await;
    let runs = factory.test_runs(true).await;

    let scenario = Scenario::new("scen-1", "gateway failover", ScenarioType::Combined, Payload::new())
        .with_status(ScenarioStatus::Active);
    scenarios.create(scenario).await.unwrap();
    runs.create(TestRun::new("run-1", "scen-1", Payload::new())).await.unwrap();

    runs.start_run("run-1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let done = runs.complete_run("run-1", RunStatus::Passed, Some(0)).await.unwrap();

    assert!(done.duration_ms.unwrap() >= 0);
    assert_eq!(runs.calculate_pass_rate("scen-1").await.unwrap(), 1.0);
    assert_eq!(scenarios.get_active_scenarios().await.unwrap().len(), 1);
    assert!(matches!(
        runs.update_status("run-1", RunStatus::Running).await,
        Err(AdapterError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_update_of_never_created_id_is_not_found() {
    let factory = AdapterFactory::default();

    let err = factory
        .scenarios(true)
        .await
        .update(Scenario::new("nope", "n", ScenarioType::DataCorruption, Payload::new()))
        .await
        .unwrap_err();

    assert_eq!(err, AdapterError::not_found(EntityKind::Scenario, "nope"));
}

// == Events and Results ==

#[tokio::test]
async fn test_chaos_event_recovery_and_results() {
    let factory = AdapterFactory::default();
    let events = factory.chaos_events(true).await;
    let results = factory.test_results(true).await;

    events
        .create(
            ChaosEvent::new("ev-1", "run-1", EventType::ServiceKill, "matcher", Payload::new())
                .with_status(EventStatus::Injected),
        )
        .await
        .unwrap();
    assert_eq!(events.get_active_events().await.unwrap().len(), 1);
    events.record_recovery("ev-1", 2500).await.unwrap();
    assert!(events.get_active_events().await.unwrap().is_empty());
    assert_eq!(
        events
            .calculate_average_recovery_time(EventType::ServiceKill)
            .await
            .unwrap(),
        2500.0
    );

    let batch = [
        ResultStatus::Passed,
        ResultStatus::Passed,
        ResultStatus::Passed,
        ResultStatus::Failed,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, status)| {
        TestResult::new(
            format!("res-{i}"),
            "run-1",
            AssertionType::RecoveryTime,
            "< 5000ms",
            "2500ms",
            status,
        )
    })
    .collect();
    results.bulk_create(batch).await.unwrap();

    assert_eq!(results.calculate_pass_rate("run-1").await.unwrap(), 0.75);
    assert_eq!(results.calculate_pass_rate("run-2").await.unwrap(), 0.0);
    assert_eq!(results.get_failed_results("run-1").await.unwrap().len(), 1);
}

// == Service Discovery ==

#[tokio::test]
async fn test_stale_services_are_removed() {
    let factory = AdapterFactory::default();
    let services = factory.service_discovery(true).await;
    services
        .register(
            ServiceInfo::new("old", "risk", "1.0.0", "localhost", 50051, 8080)
                .with_last_seen(Utc::now() - chrono::Duration::seconds(120)),
        )
        .await
        .unwrap();
    services
        .register(ServiceInfo::new("new", "risk", "1.0.0", "localhost", 50052, 8081))
        .await
        .unwrap();

    assert_eq!(services.remove_stale_services(60).await.unwrap(), 1);
    assert!(services.get_service_by_id("new").await.unwrap().is_some());
    assert_eq!(services.get_service_by_id("old").await.unwrap(), None);
    assert!(services.is_service_healthy("new", 60).await.unwrap());
}
