use std::sync::Arc;
use std::time::{Duration, Instant};

use rover_photo_downloader::downloader::{RunConfig, RunCoordinator, RunError};
use rover_photo_downloader::fetcher::api_config::ApiConfig;
use rover_photo_downloader::shutdown::ShutdownCoordinator;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let shutdown = ShutdownCoordinator::shared();
    let waiter = {
        let handle = shutdown.clone();
        tokio::spawn(async move {
            handle.wait_for_shutdown().await;
            true
        })
    };

    // Give the task time to start waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok());
}

/// A request landing before the wait starts must not be missed.
#[tokio::test]
async fn shutdown_requested_before_wait_no_deadlock() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let handle = shutdown.clone();
    let waiter = tokio::spawn(async move {
        handle.wait_for_shutdown().await;
        true
    });

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok(), "wait_for_shutdown() deadlocked despite shutdown already requested");
}

#[tokio::test]
async fn shutdown_concurrent_waiters_all_notified() {
    let shutdown = ShutdownCoordinator::shared();

    let mut waiters = Vec::new();
    for _ in 0..10 {
        let handle = shutdown.clone();
        waiters.push(tokio::spawn(async move {
            handle.wait_for_shutdown().await;
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.request_shutdown();

    for waiter in waiters {
        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok(), "A waiter was not notified of shutdown");
    }
}

/// Ctrl+C during a run aborts in-flight downloads and reports cancellation.
#[tokio::test]
async fn shutdown_cancels_run_with_slow_images() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let photos: Vec<_> = (0..3)
        .map(|i| serde_json::json!({"img_src": format!("{}/img/slow{i}.jpg", server.uri())}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"photos": photos})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"photos": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".as_slice())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let shutdown = ShutdownCoordinator::shared();
    let coordinator = RunCoordinator::new(RunConfig::new(
        temp_dir.path(),
        ApiConfig::new(format!("{}/photos", server.uri()), "key"),
    ))
    .with_http_client(Arc::new(reqwest::Client::new()))
    .with_shutdown(shutdown.clone());

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            shutdown.request_shutdown();
        }
    });

    let started = Instant::now();
    let err = coordinator.run(Some("2020-8-6")).await.unwrap_err();

    assert!(matches!(err, RunError::Cancelled), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
}

/// A finished run leaves the caller's handle untouched.
#[tokio::test]
async fn completed_run_does_not_request_outer_shutdown() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"photos": []})))
        .mount(&server)
        .await;

    let shutdown = ShutdownCoordinator::shared();
    let report = RunCoordinator::new(RunConfig::new(
        temp_dir.path(),
        ApiConfig::new(format!("{}/photos", server.uri()), "key"),
    ))
    .with_http_client(Arc::new(reqwest::Client::new()))
    .with_shutdown(shutdown.clone())
    .run(Some("2020-8-6"))
    .await
    .unwrap();

    assert_eq!(report.discovered, 0);
    assert!(!shutdown.is_shutdown_requested());
}
