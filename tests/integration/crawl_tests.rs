//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wavecrawl::config::{Config, RobotsFallback};
use wavecrawl::crawler::{build_http_client, crawl, FetchClient, RetryPolicy};
use wavecrawl::output::{page_key, CrawlReport, MemorySink, MANIFEST_HEADER};
use wavecrawl::{Crawler, PageOutcome, RunState, ScopeFilter};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for the given seed
fn create_test_config(seed: &str) -> Config {
    let mut config = Config::with_seed(seed);
    config.crawl.max_pages = 20;
    config.crawl.max_workers = 3;
    config.politeness.fixed_delay_ms = Some(0);
    config.retry.attempts = 2;
    config.retry.base_delay_ms = 10;
    config.retry.increment_ms = 10;
    config.fetch.timeout_secs = 2;
    config.robots.agent = "TestBot".to_string();
    config.robots.fallback = RobotsFallback::Allow;
    config
}

/// Builds an HTML page linking to each href
fn html_page(title: &str, hrefs: &[&str]) -> String {
    let links: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, links
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

/// Mounts a page expected to be fetched exactly `times` times
async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_response(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

async fn run_crawl(config: &Config, sink: Arc<MemorySink>) -> (Crawler, CrawlReport) {
    let mut crawler = Crawler::new(config, sink).expect("Failed to create crawler");
    let report = crawler.run().await.expect("Crawl failed");
    (crawler, report)
}

fn assert_no_duplicates(urls: &[String]) {
    let unique: HashSet<&String> = urls.iter().collect();
    assert_eq!(unique.len(), urls.len(), "Duplicate URLs in {:?}", urls);
}

#[tokio::test]
async fn test_scope_filtering_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            &["/x", "https://b.com/y", "/login", "/img.png"],
        ),
        1,
    )
    .await;
    mount_page(&server, "/x", html_page("X", &[]), 1).await;
    mount_page(&server, "/login", html_page("Login", &[]), 0).await;
    mount_page(&server, "/img.png", html_page("Image", &[]), 0).await;

    let seed = format!("{}/", base);
    let sink = Arc::new(MemorySink::new());
    let (crawler, report) = run_crawl(&create_test_config(&seed), sink.clone()).await;

    let manifest = sink.manifest_urls().expect("Manifest was not written");
    assert_eq!(manifest, vec![seed.clone(), format!("{}/x", base)]);
    assert_eq!(crawler.state(), RunState::Done);
    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.count(PageOutcome::Fetched), 2);

    // Out-of-scope links are never queued, so they are never dispatched either
    assert_eq!(report.dispatched(), 2);
    assert!(!crawler.frontier().has_seen("https://b.com/y"));
}

#[tokio::test]
async fn test_single_page_budget() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let children = ["/c1", "/c2", "/c3", "/c4", "/c5"];
    mount_page(&server, "/", html_page("Home", &children), 1).await;
    for child in children {
        mount_page(&server, child, html_page(child, &[]), 0).await;
    }

    let seed = format!("{}/", server.uri());
    let mut config = create_test_config(&seed);
    config.crawl.max_pages = 1;

    let sink = Arc::new(MemorySink::new());
    let (crawler, report) = run_crawl(&config, sink.clone()).await;

    assert_eq!(sink.manifest_urls(), Some(vec![seed]));
    assert_eq!(crawler.frontier().pending_len(), 5);
    assert_eq!(report.pending_left, 5);
    assert_eq!(report.batches, 1);
}

#[tokio::test]
async fn test_unreachable_robots_with_deny_fallback() {
    // Bind then drop a listener so nothing answers on the port
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let seed = format!("http://127.0.0.1:{}/", port);
    let mut config = create_test_config(&seed);
    config.robots.fallback = RobotsFallback::Deny;

    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&config, sink.clone()).await;

    assert_eq!(sink.manifest_urls(), Some(vec![]));
    assert!(sink.saved_urls().is_empty());
    assert_eq!(report.count(PageOutcome::RobotsDenied), 1);
    assert_eq!(report.count(PageOutcome::FetchFailed), 0);
}

#[tokio::test]
async fn test_robots_server_error_with_deny_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", html_page("Home", &[]), 0).await;

    let seed = format!("{}/", server.uri());
    let mut config = create_test_config(&seed);
    config.robots.fallback = RobotsFallback::Deny;

    let sink = Arc::new(MemorySink::new());
    run_crawl(&config, sink.clone()).await;

    assert_eq!(sink.manifest_urls(), Some(vec![]));
}

#[tokio::test]
async fn test_fetch_recovers_after_two_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_response("late".to_string()).set_delay(Duration::from_secs(2)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/slow", "<html>finally</html>".to_string(), 1).await;

    let retry = RetryPolicy {
        attempts: 3,
        base_delay: Duration::from_millis(150),
        increment: Duration::from_millis(100),
    };
    let client = FetchClient::new(
        vec![build_http_client(Duration::from_millis(250), None).unwrap()],
        vec!["TestAgent/1.0".to_string()],
        retry,
    );

    let start = Instant::now();
    let body = client.fetch(&format!("{}/slow", server.uri()), 3).await;

    assert_eq!(body, "<html>finally</html>");
    // Two timed-out attempts followed by backoffs of 150ms and 250ms
    assert!(start.elapsed() >= Duration::from_millis(2 * 250 + 150 + 250));
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    // Every page links to every other page, including itself
    let all = ["/", "/a", "/b", "/c", "/d"];
    for page in all {
        mount_page(&server, page, html_page(page, &all), 1).await;
    }

    let seed = format!("{}/", server.uri());
    let mut config = create_test_config(&seed);
    config.crawl.max_workers = 2;

    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&config, sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(manifest.len(), 5);
    assert_no_duplicates(&manifest);
    assert_no_duplicates(&sink.saved_urls());
    assert_eq!(report.dispatched(), 5);
    assert_eq!(report.count(PageOutcome::AlreadyVisited), 0);
}

#[tokio::test]
async fn test_seed_without_trailing_slash_matches_links_home() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(&server, "/", html_page("Home", &["/", "/a"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/"]), 1).await;

    // server.uri() has no trailing slash, while links back home resolve to "/"
    let seed = server.uri();
    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&create_test_config(&seed), sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(
        manifest,
        vec![format!("{}/", seed), format!("{}/a", seed)]
    );
    assert_no_duplicates(&sink.saved_urls());
    assert_eq!(report.seed, format!("{}/", seed));
    assert_eq!(report.count(PageOutcome::Fetched), 2);
}

#[tokio::test]
async fn test_budget_bounds_visited_and_batches() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    // A binary tree of pages: /p{n} links to /p{2n} and /p{2n+1}
    for n in 1..=40u32 {
        let left = format!("/p{}", 2 * n);
        let right = format!("/p{}", 2 * n + 1);
        Mock::given(method("GET"))
            .and(path(format!("/p{}", n)))
            .respond_with(html_response(html_page("node", &[left.as_str(), right.as_str()])))
            .mount(&server)
            .await;
    }

    let seed = format!("{}/p1", server.uri());
    let mut config = create_test_config(&seed);
    config.crawl.max_pages = 7;
    config.crawl.max_workers = 3;

    let sink = Arc::new(MemorySink::new());
    let (crawler, report) = run_crawl(&config, sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(manifest.len(), 7);
    assert!(report.batches <= 7usize.div_ceil(3) + 1);
    assert!(crawler.frontier().pending_len() > 0);

    let scope = ScopeFilter::for_seed(&seed, &config.scope).unwrap();
    assert!(manifest.iter().all(|url| scope.in_scope(url)));
}

#[tokio::test]
async fn test_sequential_mode_visits_breadth_first() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(&server, "/", html_page("Root", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/a1"]), 1).await;
    mount_page(&server, "/b", html_page("B", &["/b1"]), 1).await;
    mount_page(&server, "/a1", html_page("A1", &[]), 1).await;
    mount_page(&server, "/b1", html_page("B1", &[]), 1).await;

    let base = server.uri();
    let seed = format!("{}/", base);
    let mut config = create_test_config(&seed);
    config.crawl.max_workers = 1;

    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&config, sink.clone()).await;

    let expected: Vec<String> = ["/", "/a", "/b", "/a1", "/b1"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    assert_eq!(sink.manifest_urls(), Some(expected));
    // One URL per batch
    assert_eq!(report.batches, 5);
}

#[tokio::test]
async fn test_robots_disallowed_pages_are_not_fetched() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    mount_page(&server, "/", html_page("Home", &["/public", "/private/x"]), 1).await;
    mount_page(&server, "/public", html_page("Public", &[]), 1).await;
    mount_page(&server, "/private/x", html_page("Secret", &[]), 0).await;

    let base = server.uri();
    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&create_test_config(&format!("{}/", base)), sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(manifest.len(), 2);
    assert!(!manifest.contains(&format!("{}/private/x", base)));
    assert_eq!(report.count(PageOutcome::RobotsDenied), 1);
}

#[tokio::test]
async fn test_failed_page_is_not_retried_when_rediscovered() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(&server, "/", html_page("Home", &["/broken", "/a"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/broken"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let sink = Arc::new(MemorySink::new());
    let (_, report) = run_crawl(&create_test_config(&format!("{}/", base)), sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(manifest, vec![format!("{}/", base), format!("{}/a", base)]);
    assert_eq!(report.count(PageOutcome::FetchFailed), 1);
}

#[tokio::test]
async fn test_non_html_pages_are_not_visited() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(&server, "/", html_page("Home", &["/data"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let sink = Arc::new(MemorySink::new());
    run_crawl(&create_test_config(&seed), sink.clone()).await;

    assert_eq!(sink.manifest_urls(), Some(vec![seed]));
}

#[tokio::test]
async fn test_worker_failure_is_isolated() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let base = server.uri();
    mount_page(&server, "/", html_page("Home", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/a1"]), 1).await;
    mount_page(&server, "/b", html_page("B", &[]), 1).await;
    mount_page(&server, "/a1", html_page("A1", &[]), 0).await;

    let failing = format!("{}/a", base);
    let sink = Arc::new(MemorySink::failing_on([failing.clone()]));
    let (_, report) = run_crawl(&create_test_config(&format!("{}/", base)), sink.clone()).await;

    let manifest = sink.manifest_urls().unwrap();
    assert_eq!(manifest, vec![format!("{}/", base), format!("{}/b", base)]);
    assert!(!manifest.contains(&failing));
    assert_eq!(report.count(PageOutcome::WorkerFailed), 1);
}

#[tokio::test]
async fn test_crawl_writes_pages_and_manifest() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let home = html_page("Home", &["/about"]);
    mount_page(&server, "/", home.clone(), 1).await;
    mount_page(&server, "/about", html_page("About", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());
    let mut config = create_test_config(&seed);
    config.output.pages_dir = dir.path().join("pages").to_string_lossy().to_string();
    config.output.manifest_path = dir
        .path()
        .join("crawled_urls.csv")
        .to_string_lossy()
        .to_string();

    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.pages_visited(), 2);

    let page_file = dir
        .path()
        .join("pages")
        .join(format!("{}.html", page_key(&seed)));
    assert_eq!(std::fs::read_to_string(page_file).unwrap(), home);

    let manifest = std::fs::read_to_string(dir.path().join("crawled_urls.csv")).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines[0], MANIFEST_HEADER);
    assert_eq!(lines[1], seed);
    assert_eq!(lines.len(), 3);
}
