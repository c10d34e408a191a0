//! Integration tests for the crawl loop

use crate::support::{html_page, mount_page, mount_robots, test_config};
use linkprobe::crawler::run_crawl;
use linkprobe::output::{write_report, CRAWL_REPORT_PREFIX};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_single_page_without_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(0, 500))
        .await
        .expect("Crawl failed to start");

    assert_eq!(results.len(), 1);
    let page = &results[0];
    assert_eq!(page.url, format!("{}/", mock_server.uri()));
    assert_eq!(page.status, Some(200));
    assert!(page.ok);
    assert_eq!(page.error, None);
    assert_eq!(page.content_type, None);
    assert!(!page.redirected);
    assert!(page.redirect_chain.is_empty());
    assert_eq!(page.depth, 0);
    assert!(page.elapsed_ms.is_some());
}

#[tokio::test]
async fn test_single_html_page_has_title() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Home Title", &["/next"]).await;

    Mock::given(path("/next"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(0, 500)).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title.as_deref(), Some("Home Title"));
    assert_eq!(results[0].content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn test_page_body_is_read_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    // The body read for the title also feeds link extraction
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page("Home", &["/a"]), "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/a", "A", &[]).await;

    let results = run_crawl(&mock_server.uri(), test_config(1, 500)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title.as_deref(), Some("Home"));
    assert_eq!(results[1].title.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_redirect_chain_is_recorded() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/home"))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    let results = run_crawl(&base, test_config(0, 500)).await.unwrap();

    assert_eq!(results.len(), 1);
    let page = &results[0];
    assert_eq!(page.url, format!("{}/", base));
    assert_eq!(page.final_url, format!("{}/home", base));
    assert_eq!(page.status, Some(200));
    assert!(page.redirected);
    assert_eq!(
        page.redirect_chain_display(),
        format!("{}/ -> {}/home", base, base)
    );
    assert_eq!(page.redirect_chain.first(), Some(&page.url));
    assert_eq!(page.redirect_chain.last(), Some(&page.final_url));
}

#[tokio::test]
async fn test_robots_blocked_pages_do_not_count() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private/\n").await;
    mount_page(&mock_server, "/", "Home", &["/private/a", "/public/1", "/public/2"]).await;
    mount_page(&mock_server, "/public/1", "Public 1", &[]).await;

    Mock::given(method("HEAD"))
        .and(path("/private/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = run_crawl(&base, test_config(1, 2)).await.unwrap();

    let urls: Vec<_> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/private/a", base),
            format!("{}/public/1", base),
        ]
    );

    let blocked = &results[1];
    assert!(blocked.is_robots_blocked());
    assert_eq!(blocked.status, None);
    assert!(!blocked.ok);
    assert_eq!(blocked.error.as_deref(), Some("Blocked by robots.txt"));
    assert_eq!(blocked.elapsed_ms, None);
    assert_eq!(blocked.depth, 1);

    assert_eq!(results[0].title.as_deref(), Some("Home"));
    assert_eq!(results[2].status, Some(200));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = test_config(0, 500);
    config.http.timeout = 0.3;
    config.robots.respect = false;

    let results = run_crawl(&mock_server.uri(), config).await.unwrap();

    assert_eq!(results.len(), 1);
    let page = &results[0];
    assert_eq!(page.status, None);
    assert!(!page.ok);
    let error = page.error.as_deref().unwrap();
    assert!(
        error == "Read timeout" || error == "Connection timeout",
        "unexpected error: {}",
        error
    );
}

#[tokio::test]
async fn test_depth_bound() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Root", &["/d1"]).await;
    mount_page(&mock_server, "/d1", "D1", &["/d2"]).await;

    Mock::given(method("HEAD"))
        .and(path("/d2"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    // Read once for the title; pages at the depth limit are never mined for links
    Mock::given(method("GET"))
        .and(path("/d2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page("D2", &["/d3"]), "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(path("/d3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(2, 500)).await.unwrap();

    let depths: Vec<u32> = results.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
    assert!(results.iter().all(|r| r.depth <= 2));
    assert_eq!(results[2].title.as_deref(), Some("D2"));
}

#[tokio::test]
async fn test_page_bound() {
    let mock_server = MockServer::start().await;

    let links: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", "Root", &link_refs).await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(1, 3)).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[1].url, format!("{}/p0", mock_server.uri()));
    assert_eq!(results[2].url, format!("{}/p1", mock_server.uri()));
}

#[tokio::test]
async fn test_cyclic_links_visit_each_page_once() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Root", &["/a", "/b", "/#top", "/"]).await;
    mount_page(&mock_server, "/a", "A", &["/", "/b", "/a"]).await;
    mount_page(&mock_server, "/b", "B", &["/a", "/", "/b?"]).await;

    let results = run_crawl(&mock_server.uri(), test_config(5, 500)).await.unwrap();

    let unique: HashSet<_> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(unique.len(), results.len());
    assert!(results.len() >= 3);
    assert!(unique.contains(format!("{}/a", mock_server.uri()).as_str()));
    assert!(unique.contains(format!("{}/b", mock_server.uri()).as_str()));
}

#[tokio::test]
async fn test_same_domain_only_skips_other_servers() {
    let home_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let other_link = format!("{}/elsewhere", other_server.uri());

    mount_page(&home_server, "/", "Home", &[other_link.as_str(), "/local"]).await;
    mount_page(&home_server, "/local", "Local", &[]).await;

    Mock::given(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other_server)
        .await;

    let results = run_crawl(&home_server.uri(), test_config(2, 500)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|r| r.url.starts_with(&home_server.uri())));
}

#[tokio::test]
async fn test_cross_domain_crawl_follows_other_servers() {
    let home_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let other_link = format!("{}/elsewhere", other_server.uri());

    mount_page(&home_server, "/", "Home", &[other_link.as_str()]).await;

    Mock::given(method("HEAD"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&other_server)
        .await;

    let mut config = test_config(1, 500);
    config.crawler.same_domain_only = false;

    let results = run_crawl(&home_server.uri(), config).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].url, other_link);
    assert_eq!(results[1].status, Some(200));
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "Home", &["/next"]).await;
    mount_page(&mock_server, "/next", "Next", &[]).await;

    let results = run_crawl(&mock_server.uri(), test_config(1, 500)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.ok));
}

#[tokio::test]
async fn test_forbidden_robots_blocks_everything() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(1, 500)).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_robots_blocked());
}

#[tokio::test]
async fn test_robots_can_be_ignored() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nDisallow: /\n").await;
    mount_page(&mock_server, "/", "Home", &[]).await;

    let mut config = test_config(0, 500);
    config.robots.respect = false;

    let results = run_crawl(&mock_server.uri(), config).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, Some(200));
}

#[tokio::test]
async fn test_crawl_report_is_written() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Home", &["/missing"]).await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let results = run_crawl(&mock_server.uri(), test_config(1, 500)).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let report = write_report(&results, dir.path(), CRAWL_REPORT_PREFIX).unwrap();

    let bytes = std::fs::read(&report).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("url"));
    assert_eq!(headers.len(), 11);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(10), Some("Home"));
    assert_eq!(rows[1].get(2), Some("404"));
    assert_eq!(rows[1].get(3), Some("false"));
    assert_eq!(rows[1].get(4), Some(""));
    assert_eq!(rows[1].get(9), Some("1"));
}
