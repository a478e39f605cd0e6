//! Worker pool fan-out against a mock image host

use rover_photo_downloader::downloader::{DownloadError, ImageDownloader, WorkerPool};
use rover_photo_downloader::ImageReference;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pool(dir: &std::path::Path) -> WorkerPool {
    WorkerPool::new(ImageDownloader::new(
        Arc::new(reqwest::Client::new()),
        dir,
    ))
}

#[tokio::test]
async fn test_every_reference_is_accounted_for() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path_regex(r"^/ok/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".as_slice()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/gone/.*"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (sender, receiver) = mpsc::unbounded_channel();
    for i in 0..20 {
        let prefix = if i % 5 == 0 { "gone" } else { "ok" };
        sender
            .send(ImageReference::new(format!("{}/{prefix}/{i}.jpg", server.uri())))
            .unwrap();
    }
    drop(sender);

    let report = pool(temp_dir.path()).run(receiver).await;

    assert_eq!(report.total(), 20);
    assert_eq!(report.succeeded, 16);
    assert_eq!(report.failures.len(), 4);
    assert_eq!(report.bytes_written, 64);
    assert!(report
        .failures
        .iter()
        .all(|f| f.reference.as_str().contains("/gone/")
            && matches!(f.cause, DownloadError::HttpError(_))));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 16);
}

#[tokio::test]
async fn test_downloads_start_before_stream_closes() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"early".as_slice()))
        .mount(&server)
        .await;

    let (sender, receiver) = mpsc::unbounded_channel();
    let handle = tokio::spawn(pool(temp_dir.path()).run(receiver));

    sender
        .send(ImageReference::new(format!("{}/first.jpg", server.uri())))
        .unwrap();

    // The first file lands while the sender is still open
    let target = temp_dir.path().join("first.jpg");
    let mut waited = Duration::ZERO;
    while !target.exists() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    assert!(target.exists());

    drop(sender);
    let report = handle.await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_capped_pool_processes_all_references() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"z".as_slice())
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;

    let (sender, receiver) = mpsc::unbounded_channel();
    for i in 0..10 {
        sender
            .send(ImageReference::new(format!("{}/{i}.jpg", server.uri())))
            .unwrap();
    }
    drop(sender);

    let report = pool(temp_dir.path())
        .with_max_concurrent(Some(3))
        .run(receiver)
        .await;

    assert_eq!(report.succeeded, 10);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_reference_without_file_name_fails_alone() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".as_slice()))
        .mount(&server)
        .await;

    let (sender, receiver) = mpsc::unbounded_channel();
    sender
        .send(ImageReference::new(format!("{}/dir/", server.uri())))
        .unwrap();
    sender
        .send(ImageReference::new(format!("{}/dir/good.jpg", server.uri())))
        .unwrap();
    drop(sender);

    let report = pool(temp_dir.path()).run(receiver).await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures.iter().next().unwrap().cause,
        DownloadError::InvalidReference(_)
    ));
}
