//! Crawl-level tests: traversal, dedup, depth, robots and link filtering

use crate::common::{fast_config, html_page, FakeOracle};
use keyword_scout::config::Config;
use keyword_scout::crawler::{build_http_client, CrawlError, CrawlReport, FrontierCrawler};
use keyword_scout::state::SkipReason;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_crawl(
    config: Config,
    oracle: FakeOracle,
    seed: &str,
    keywords: &[&str],
) -> Result<CrawlReport, CrawlError> {
    let client = build_http_client(&config).expect("Failed to build client");
    let crawler = FrontierCrawler::new(Arc::new(config), client, Arc::new(oracle));
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
    crawler
        .crawl(seed, &keywords, &CancellationToken::new())
        .await
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, from: &str, to: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(status).insert_header("Location", to))
        .expect(1)
        .mount(server)
        .await;
}

fn candidate_paths(report: &CrawlReport) -> Vec<String> {
    report
        .candidates
        .iter()
        .map(|c| url::Url::parse(&c.target_url).unwrap().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_equivalent_links_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a>
           <a href="/a#top">A again</a>
           <a href="/a?utm_source=news">A tracked</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", r#"<p>Budget</p><a href="/">Home</a>"#, 1).await;

    let report = run_crawl(fast_config(2), FakeOracle::new(6.0), &server.uri(), &["Budget"])
        .await
        .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/a"]);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_depth_limit_bounds_traversal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/one">One</a>"#, 1).await;
    mount_page(&server, "/one", r#"<p>One</p><a href="/two">Two</a>"#, 1).await;
    mount_page(&server, "/two", r#"<p>Two</p><a href="/three">Three</a>"#, 1).await;
    mount_page(&server, "/three", "<p>Three</p>", 0).await;

    let report = run_crawl(fast_config(2), FakeOracle::new(5.0), &server.uri(), &["Budget"])
        .await
        .unwrap();

    let depths: Vec<(String, u32)> = report
        .candidates
        .iter()
        .map(|c| {
            let p = url::Url::parse(&c.target_url).unwrap().path().to_string();
            (p, c.depth)
        })
        .collect();
    assert_eq!(
        depths,
        vec![("/one".to_string(), 1), ("/two".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_robots_disallowed_links_skipped_without_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/ledger">Ledger</a><a href="/public">Public</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/private/ledger", "<p>Secret</p>", 0).await;
    mount_page(&server, "/public", "<p>Open budget</p>", 1).await;

    let report = run_crawl(fast_config(1), FakeOracle::new(7.0), &server.uri(), &["Budget"])
        .await
        .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/public"]);
    assert_eq!(report.skipped_for(SkipReason::RobotsDenied), 1);
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/page">Page</a>"#, 1).await;
    mount_page(&server, "/page", "<p>Budget</p>", 1).await;

    let mut config = fast_config(1);
    config.crawler.respect_robots = false;

    let report = run_crawl(config, FakeOracle::new(7.0), &server.uri(), &["Budget"])
        .await
        .unwrap();
    assert_eq!(candidate_paths(&report), vec!["/page"]);
}

#[tokio::test]
async fn test_filtered_links_never_fetched() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/logo.png">Logo</a>
           <a href="mailto:clerk@city.gov">Email the clerk</a>
           <a href="/policies">Privacy Policy</a>
           <a href="https://facebook.com/city">City on social media</a>
           <a href="/budget">Budget documents</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/logo.png", "", 0).await;
    mount_page(&server, "/policies", "<p>Policy</p>", 0).await;
    mount_page(&server, "/budget", "<p>Operating Budget</p>", 1).await;

    let report = run_crawl(fast_config(1), FakeOracle::new(8.0), &server.uri(), &["Budget"])
        .await
        .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/budget"]);
    assert_eq!(report.skipped_total(), 0);
}

#[tokio::test]
async fn test_redirect_target_recorded_and_not_refetched() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/old">Old</a><a href="/new">New</a>"#,
        1,
    )
    .await;
    mount_redirect(&server, "/old", "/new", 301).await;
    mount_page(&server, "/new", "<p>Fiscal Year report</p>", 1).await;

    let report = run_crawl(
        fast_config(1),
        FakeOracle::new(6.0),
        &server.uri(),
        &["Fiscal Year"],
    )
    .await
    .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/new"]);
    assert_eq!(report.candidates[0].matched_keywords, vec!["Fiscal Year"]);
    assert_eq!(report.skipped_for(SkipReason::AlreadyVisited), 1);
}

#[tokio::test]
async fn test_redirects_into_visited_pages_are_not_rescored() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/new">New</a><a href="/old">Old</a><a href="/home">Home</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/new", "<p>Fiscal Year report</p>", 1).await;
    mount_redirect(&server, "/old", "/new", 301).await;
    mount_redirect(&server, "/home", "/", 301).await;

    let report = run_crawl(
        fast_config(1),
        FakeOracle::new(6.0),
        &server.uri(),
        &["Fiscal Year"],
    )
    .await
    .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/new"]);
    assert_eq!(report.skipped_for(SkipReason::AlreadyVisited), 2);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_redirect_target_checked_against_robots() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/go">Go</a>"#, 1).await;
    mount_redirect(&server, "/go", "/private/ledger", 302).await;
    mount_page(&server, "/private/ledger", "<p>Secret budget</p>", 0).await;

    let report = run_crawl(fast_config(1), FakeOracle::new(7.0), &server.uri(), &["Budget"])
        .await
        .unwrap();

    assert!(report.candidates.is_empty());
    assert_eq!(report.skipped_for(SkipReason::RobotsDenied), 1);
}

#[tokio::test]
async fn test_non_html_bodies() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/report.pdf">Report</a><a href="/notes.txt">Notes</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 binary".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("General Fund   balance\nand audit notes", "text/plain"),
        )
        .mount(&server)
        .await;

    let report = run_crawl(
        fast_config(1),
        FakeOracle::new(4.0),
        &server.uri(),
        &["Audit", "General Fund", "Treasurer"],
    )
    .await
    .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/notes.txt"]);
    let notes = &report.candidates[0];
    assert_eq!(notes.matched_keywords, vec!["Audit", "General Fund"]);
    assert_eq!(notes.file_type, "text/plain");
    assert_eq!(
        notes.extracted_text.as_deref(),
        Some("General Fund balance and audit notes")
    );
    assert_eq!(report.skipped_for(SkipReason::NoText), 1);
}

#[tokio::test]
async fn test_failed_link_fetch_is_skipped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/fine">Fine</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/fine", "<p>Revenue</p>", 1).await;

    let report = run_crawl(fast_config(1), FakeOracle::new(3.0), &server.uri(), &["Revenue"])
        .await
        .unwrap();

    assert_eq!(candidate_paths(&report), vec!["/fine"]);
    assert_eq!(report.skipped_for(SkipReason::FetchFailed), 1);
}

#[tokio::test]
async fn test_seed_error_status_is_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = run_crawl(fast_config(1), FakeOracle::new(5.0), &server.uri(), &["Budget"]).await;
    assert!(matches!(result, Err(CrawlError::SeedUnreachable { .. })));
}
