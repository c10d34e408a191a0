//! Integration tests for single page fetches

use linkprobe::config::HttpConfig;
use linkprobe::crawler::{Fetcher, CHECK_BODY_LIMIT};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> Fetcher {
    let config = HttpConfig {
        timeout: 5.0,
        ..HttpConfig::default()
    };
    Fetcher::new(&config).expect("Failed to build fetcher")
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).unwrap()
}

#[tokio::test]
async fn test_head_rejection_is_a_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = test_fetcher()
        .fetch(&page_url(&mock_server, "/"), CHECK_BODY_LIMIT)
        .await;

    assert_eq!(result.status, Some(405));
    assert!(!result.ok);
    assert_eq!(result.error, None);
    assert!(result.elapsed_ms.is_some());
}

#[tokio::test]
async fn test_server_error_is_not_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = test_fetcher()
        .fetch(&page_url(&mock_server, "/down"), CHECK_BODY_LIMIT)
        .await;

    assert_eq!(result.status, Some(503));
    assert!(!result.ok);
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    let result = test_fetcher().fetch(&url, CHECK_BODY_LIMIT).await;

    assert_eq!(result.status, None);
    assert!(!result.ok);
    let error = result.error.as_deref().unwrap();
    assert!(error.starts_with("Connection error:"), "unexpected error: {}", error);
    assert_eq!(result.final_url, result.url);
}

#[tokio::test]
async fn test_get_retry_reads_title() {
    let mock_server = MockServer::start().await;

    // A HEAD that hangs past the timeout forces the GET retry
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head><title> Retried </title></head></html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpConfig {
        timeout: 0.5,
        ..HttpConfig::default()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let result = fetcher.fetch(&page_url(&mock_server, "/"), CHECK_BODY_LIMIT).await;

    assert_eq!(result.status, Some(200));
    assert!(result.ok);
    assert_eq!(result.title.as_deref(), Some("Retried"));
    assert!(result.is_html());
}

#[tokio::test]
async fn test_redirect_loop_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&mock_server)
        .await;

    let result = test_fetcher()
        .fetch(&page_url(&mock_server, "/loop"), CHECK_BODY_LIMIT)
        .await;

    assert_eq!(result.status, None);
    assert!(result.error.as_deref().unwrap().starts_with("Error:"));
}

#[tokio::test]
async fn test_fetch_body_follows_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(308).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let body = test_fetcher()
        .fetch_body(&page_url(&mock_server, "/old"), 4)
        .await
        .unwrap();

    assert_eq!(body.status, 200);
    assert_eq!(body.final_url, page_url(&mock_server, "/new"));
    assert_eq!(body.charset.as_deref(), Some("utf-8"));
    assert_eq!(body.bytes, b"<p>m");
}
