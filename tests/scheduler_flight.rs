//! Scheduler gate tests: one update in flight at a time, manual triggers
//! share the gate, and failures release it.

use std::time::Duration;

use httptest::{matchers::request, responders::status_code, Expectation, Server};
use tempfile::TempDir;

use ip_location_updater::{RetryPolicy, TriggerOutcome, UpdateError, UpdateScheduler};

#[path = "helpers.rs"]
mod helpers;

use helpers::{dataset_url, sample_dataset, serve_dataset, test_config};

#[tokio::test]
async fn test_concurrent_triggers_admit_exactly_one() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp.path().join("geo.db");
    let server = Server::run();
    // The single expected fetch doubles as proof that only one update ran
    serve_dataset(&server, sample_dataset(), 1);

    let scheduler = UpdateScheduler::new(test_config(&db_path, dataset_url(&server)));
    let (first, second) = tokio::join!(scheduler.trigger_update(), scheduler.trigger_update());

    let outcomes = [first, second];
    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, TriggerOutcome::Completed(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, TriggerOutcome::Skipped))
        .count();
    assert_eq!(completed, 1, "exactly one trigger should run: {:?}", outcomes);
    assert_eq!(skipped, 1, "the other trigger should be skipped");
    assert!(scheduler.last_update().is_some());
}

#[tokio::test]
async fn test_sequential_triggers_each_run() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp.path().join("geo.db");
    let server = Server::run();
    serve_dataset(&server, sample_dataset(), 2);

    let scheduler = UpdateScheduler::new(test_config(&db_path, dataset_url(&server)));

    match scheduler.trigger_update().await {
        TriggerOutcome::Completed(report) => assert!(report.bootstrap),
        other => panic!("first trigger should complete, got {:?}", other),
    }
    match scheduler.trigger_update().await {
        TriggerOutcome::Completed(report) => {
            assert!(!report.bootstrap);
            assert_eq!(report.rows_loaded, 3);
        }
        other => panic!("second trigger should complete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_update_releases_the_gate() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp.path().join("geo.db");
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/dataset.csv"))
            .times(2)
            .respond_with(status_code(503)),
    );

    let scheduler = UpdateScheduler::new(test_config(&db_path, dataset_url(&server)));

    let first = scheduler.trigger_update().await;
    assert!(matches!(first, TriggerOutcome::Failed(UpdateError::Network(_))));

    // A second trigger runs rather than being skipped, so the gate reopened
    let second = scheduler.trigger_update().await;
    assert!(matches!(second, TriggerOutcome::Failed(UpdateError::Network(_))));

    assert!(scheduler.last_update().is_none());
}

#[tokio::test]
async fn test_connection_failure_spends_whole_budget_and_skips_fetch() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    // Parent directory is missing, so every connection attempt fails
    let db_path = temp.path().join("missing").join("geo.db");
    // No expectations: any fetch would fail verification when the server drops
    let server = Server::run();

    let mut config = test_config(&db_path, dataset_url(&server));
    config.connect_retry = RetryPolicy {
        max_attempts: 10,
        delay: Duration::ZERO,
    };
    let scheduler = UpdateScheduler::new(config);

    match scheduler.trigger_update().await {
        TriggerOutcome::Failed(UpdateError::Connection { attempts, .. }) => {
            assert_eq!(attempts, 10)
        }
        other => panic!("expected a connection failure, got {:?}", other),
    }
    assert!(scheduler.last_update().is_none());
}
