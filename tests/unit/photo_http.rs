//! Unit tests for the photos API client against a mock server

use rover_photo_downloader::date::DateKey;
use rover_photo_downloader::fetcher::api_config::ApiConfig;
use rover_photo_downloader::fetcher::{FetcherError, PageSource, PhotoApiClient};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, key: &str) -> PhotoApiClient {
    PhotoApiClient::new(
        Arc::new(reqwest::Client::new()),
        ApiConfig::new(format!("{}/photos", server.uri()), key),
    )
}

fn date() -> DateKey {
    DateKey::parse("2015-06-03").unwrap()
}

#[tokio::test]
async fn test_request_carries_key_date_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("api_key", "secret"))
        .and(query_param("earth_date", "2015-6-3"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "photos": [
                {"id": 1, "sol": 1000, "img_src": "https://foo.com/a.jpg"},
                {"id": 2, "sol": 1000, "img_src": "https://foo.com/b.jpg"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, "secret").fetch_page(&date(), 2).await.unwrap();

    assert_eq!(page.photos.len(), 2);
    assert_eq!(page.photos[0].img_src, "https://foo.com/a.jpg");
    assert!(page.error.is_none());
}

#[tokio::test]
async fn test_missing_photos_field_is_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let page = client_for(&server, "key").fetch_page(&date(), 1).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_error_object_on_forbidden_is_returned_as_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": "API_KEY_INVALID", "message": "An invalid api_key was supplied"}
        })))
        .mount(&server)
        .await;

    let page = client_for(&server, "bad").fetch_page(&date(), 1).await.unwrap();

    let err = page.into_references().unwrap_err();
    match err {
        FetcherError::ApiError(msg) => assert_eq!(msg, "An invalid api_key was supplied"),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_without_body_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server, "key")
        .fetch_page(&date(), 1)
        .await
        .unwrap_err();

    match err {
        FetcherError::HttpError(msg) => {
            assert!(msg.contains("500"), "message: {msg}");
            assert!(msg.contains("upstream down"), "message: {msg}");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, "key")
        .fetch_page(&date(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, FetcherError::ParseError(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let client = PhotoApiClient::new(
        Arc::new(reqwest::Client::new()),
        ApiConfig::new("http://127.0.0.1:1/photos", "key"),
    );

    let err = client.fetch_page(&date(), 1).await.unwrap_err();
    assert!(matches!(err, FetcherError::NetworkError(_)));
}
