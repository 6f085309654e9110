//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_scroll::config::{
    BudgetConfig, Config, CrawlRequest, CrawlSection, CrawlerConfig, HttpConfig, OutputConfig,
};
use sumi_scroll::crawler::Coordinator;
use sumi_scroll::progress::{CollectingReporter, NullReporter};
use sumi_scroll::OutcomeStatus;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at `seed`
fn create_test_config(seed: &str, crawler: CrawlerConfig) -> Config {
    Config {
        crawl: CrawlSection {
            url: seed.to_string(),
            selector: Some("article".to_string()),
            wait_time: 0.01, // Very short for testing
            save_to_file: false,
        },
        crawler,
        http: HttpConfig {
            timeout_secs: 5,
            ..HttpConfig::default()
        },
        output: OutputConfig::default(),
        budget: BudgetConfig::default(),
    }
}

fn request(config: Config) -> CrawlRequest {
    CrawlRequest::from_config(config).expect("valid test config")
}

/// A documentation page whose article links to `links`
fn doc_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><nav>nav</nav><article><h1>{}</h1><p>Body of {}</p>{}</article></body></html>",
        title, title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_in_scope() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs/app",
        doc_page(
            "App",
            &[
                "/docs/app/page1",
                "/docs/app/page2",
                "/docs/pages/old",
                "https://external.com/docs/app",
            ],
        ),
        1,
    )
    .await;
    mount_page(&server, "/docs/app/page1", doc_page("Page 1", &[]), 1).await;
    mount_page(&server, "/docs/app/page2", doc_page("Page 2", &[]), 1).await;
    mount_page(&server, "/docs/pages/old", doc_page("Old", &[]), 0).await;

    let config = create_test_config(
        &format!("{}/docs/app", base),
        CrawlerConfig {
            max_depth: 2,
            max_pages: 5,
            include_patterns: vec!["/docs/app.*".to_string()],
            exclude_patterns: vec!["/docs/pages.*".to_string()],
            ..CrawlerConfig::default()
        },
    );

    let coordinator = Coordinator::new(request(config), Arc::new(NullReporter)).unwrap();
    let outcome = coordinator.run().await.expect("crawl should succeed");

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.total_pages, 3);
    assert_eq!(outcome.total_pages, outcome.pages.len());

    let urls: Vec<&str> = outcome.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/docs/app", base),
            format!("{}/docs/app/page1", base),
            format!("{}/docs/app/page2", base),
        ]
    );

    let depths: Vec<u32> = outcome.pages.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![0, 1, 1]);

    let seed = &outcome.pages[0];
    assert!(seed.markdown_content.contains("# App"));
    assert!(seed.markdown_content.contains("[/docs/app/page1](/docs/app/page1)"));
    assert!(!seed.markdown_content.contains("nav"));
    assert!(seed.content.starts_with("<article>"));
}

#[tokio::test]
async fn test_max_pages_bound() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs",
        doc_page("Docs", &["/docs/a", "/docs/b", "/docs/c", "/docs/d"]),
        1,
    )
    .await;
    mount_page(&server, "/docs/a", doc_page("A", &[]), 1).await;
    mount_page(&server, "/docs/b", doc_page("B", &[]), 1).await;
    mount_page(&server, "/docs/c", doc_page("C", &[]), 0).await;
    mount_page(&server, "/docs/d", doc_page("D", &[]), 0).await;

    let config = create_test_config(
        &format!("{}/docs", base),
        CrawlerConfig {
            max_pages: 3,
            ..CrawlerConfig::default()
        },
    );

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.pages.len(), 3);
}

#[tokio::test]
async fn test_max_depth_bound() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs", doc_page("Docs", &["/docs/one"]), 1).await;
    mount_page(&server, "/docs/one", doc_page("One", &["/docs/one/two"]), 1).await;
    mount_page(
        &server,
        "/docs/one/two",
        doc_page("Two", &["/docs/one/two/three"]),
        0,
    )
    .await;

    let config = create_test_config(
        &format!("{}/docs", base),
        CrawlerConfig {
            max_depth: 1,
            ..CrawlerConfig::default()
        },
    );

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.pages.len(), 2);
    assert!(outcome.pages.iter().all(|p| p.depth <= 1));
}

#[tokio::test]
async fn test_equivalent_links_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs",
        doc_page(
            "Docs",
            &["/docs/guide", "/docs/guide/", "/docs/guide?tab=1", "/docs/guide#intro"],
        ),
        1,
    )
    .await;
    // The guide links back to the seed and to itself
    mount_page(
        &server,
        "/docs/guide",
        doc_page("Guide", &["/docs", "/docs/", "/docs/guide"]),
        1,
    )
    .await;

    let config = create_test_config(&format!("{}/docs", base), CrawlerConfig::default());

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.pages.len(), 2);

    let mut urls: Vec<&str> = outcome.pages.iter().map(|p| p.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 2, "No URL may be processed twice");
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs",
        doc_page("Docs", &["/docs/broken", "/docs/working"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/docs/working",
        doc_page("Working", &["/docs/broken"]),
        1,
    )
    .await;

    let config = create_test_config(&format!("{}/docs", base), CrawlerConfig::default());

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.pages[1].url, format!("{}/docs/working", base));

    assert_eq!(outcome.failed_pages.len(), 1);
    assert_eq!(outcome.failed_pages[0].url, format!("{}/docs/broken", base));
    assert_eq!(outcome.failed_pages[0].reason, "HTTP 500");
}

#[tokio::test]
async fn test_out_of_scope_links_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs",
        doc_page(
            "Docs",
            &["/blog/post", "/docs/internal/secret", "/docs/public", "mailto:docs@example.org"],
        ),
        1,
    )
    .await;
    mount_page(&server, "/docs/public", doc_page("Public", &[]), 1).await;
    mount_page(&server, "/blog/post", doc_page("Blog", &[]), 0).await;
    mount_page(&server, "/docs/internal/secret", doc_page("Secret", &[]), 0).await;

    let config = create_test_config(
        &format!("{}/docs", base),
        CrawlerConfig {
            exclude_patterns: vec!["/internal/".to_string()],
            ..CrawlerConfig::default()
        },
    );

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    let urls: Vec<&str> = outcome.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/docs", base), format!("{}/docs/public", base)]
    );
}

#[tokio::test]
async fn test_cancellation_returns_partial_outcome() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs", doc_page("Docs", &["/docs/slow"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/docs/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(doc_page("Slow", &[]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/docs", base), CrawlerConfig::default());
    let reporter = Arc::new(CollectingReporter::new());
    let coordinator = Coordinator::new(request(config), reporter.clone()).unwrap();

    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let outcome = coordinator.run().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.error.as_deref(), Some("crawl cancelled"));
    assert_eq!(outcome.pages.len(), 1);

    let last = reporter.events().pop().unwrap();
    assert_eq!(last.message, "Error: crawl cancelled");
    assert_eq!(last.progress, Some(-1.0));
}

#[tokio::test]
async fn test_concurrent_crawl_respects_page_bound() {
    let server = MockServer::start().await;
    let base = server.uri();

    let children = ["/docs/p1", "/docs/p2", "/docs/p3", "/docs/p4", "/docs/p5", "/docs/p6"];
    mount_page(&server, "/docs", doc_page("Docs", &children), 1).await;
    for child in children {
        Mock::given(method("GET"))
            .and(path(child))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(doc_page(child, &[]))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&server)
            .await;
    }

    let config = create_test_config(
        &format!("{}/docs", base),
        CrawlerConfig {
            max_pages: 4,
            concurrency: 3,
            ..CrawlerConfig::default()
        },
    );

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.pages.len(), 4);

    // The bound stops admission, so no extra pages were fetched and dropped
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_progress_events() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs", doc_page("Docs", &["/docs/next"]), 1).await;
    mount_page(&server, "/docs/next", doc_page("Next", &[]), 1).await;

    let config = create_test_config(
        &format!("{}/docs", base),
        CrawlerConfig {
            max_pages: 4,
            ..CrawlerConfig::default()
        },
    );
    let reporter = Arc::new(CollectingReporter::new());
    Coordinator::new(request(config), reporter.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    let events = reporter.events();
    let summary: Vec<(String, Option<f64>)> = events
        .iter()
        .map(|e| (e.message.clone(), e.progress))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Starting crawl...".to_string(), Some(0.0)),
            (format!("Processing {}/docs", base), None),
            (format!("Processed {}/docs", base), Some(25.0)),
            (format!("Processing {}/docs/next", base), None),
            (format!("Processed {}/docs/next", base), Some(50.0)),
            ("Crawl completed successfully".to_string(), Some(100.0)),
        ]
    );

    assert!(events
        .iter()
        .all(|e| chrono::DateTime::parse_from_rfc3339(&e.timestamp).is_ok()));
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs", doc_page("Docs", &["/docs/a", "/docs/b"]), 1).await;
    mount_page(&server, "/docs/a", doc_page("A", &[]), 1).await;
    mount_page(&server, "/docs/b", doc_page("B", &[]), 1).await;

    let mut config = create_test_config(&format!("{}/docs", base), CrawlerConfig::default());
    config.crawl.wait_time = 0.2;

    let started = Instant::now();
    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.pages.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_pages_saved_to_content_dir() {
    let server = MockServer::start().await;
    let base = server.uri();
    let content = TempDir::new().unwrap();

    mount_page(&server, "/docs/app", doc_page("App", &["/docs/app/routing"]), 1).await;
    mount_page(&server, "/docs/app/routing", doc_page("Routing", &[]), 1).await;

    let mut config = create_test_config(&format!("{}/docs/app", base), CrawlerConfig::default());
    config.crawl.save_to_file = true;
    config.output.content_dir = content.path().to_string_lossy().into_owned();

    let outcome = Coordinator::new(request(config), Arc::new(NullReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome.saved_files(),
        vec![
            content.path().join("docs/app.md"),
            content.path().join("docs/app/routing.md"),
        ]
    );

    let routing = std::fs::read_to_string(content.path().join("docs/app/routing.md")).unwrap();
    assert!(routing.starts_with(&format!("---\nurl: {}/docs/app/routing\n", base)));
    assert!(routing.contains("# Routing"));
}
