//! Network-facing tests against a mock release server.
//!
//! The transport is blocking, so every pipeline call runs on
//! `spawn_blocking` while the mock server lives on the async runtime.

use std::fs;
use std::path::Path;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use h41_harvester::config::HarvesterConfig;
use h41_harvester::dates::ReleaseDate;
use h41_harvester::discovery::discover_releases;
use h41_harvester::error::FailureKind;
use h41_harvester::harvester::{compare_dates_with, harvest_with};
use h41_harvester::http::{HttpTransport, Transport, USER_AGENT};
use h41_harvester::HarvesterError;

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("h41")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn config_for(server: &MockServer) -> HarvesterConfig {
    HarvesterConfig::builder()
        .base_url(format!("{}/releases/h41", server.uri()))
        .feed_url(format!("{}/feeds/h41.xml", server.uri()))
        .timeout_secs(5)
        .max_retries(2)
        .contact("ops@example.test")
        .build()
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_feed(server: &MockServer) {
    let feed = load_fixture("feed.xml").replace("{base}", &format!("{}/releases/h41", server.uri()));
    Mock::given(method("GET"))
        .and(path("/feeds/h41.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(server)
        .await;
}

async fn mount_releases(server: &MockServer) {
    mount_html(server, "/releases/h41/20260108/", load_fixture("20260108.html")).await;
    mount_html(server, "/releases/h41/20260101/", load_fixture("20260101.html")).await;
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_sends_identifying_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", USER_AGENT))
        .and(header("from", "ops@example.test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let url = format!("{}/page", server.uri());
    let body = tokio::task::spawn_blocking(move || HttpTransport::new(&config)?.get_text(&url))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let url = format!("{}/flaky", server.uri());
    let err = tokio::task::spawn_blocking(move || HttpTransport::new(&config)?.get_text(&url))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, HarvesterError::RetriesExhausted { attempts: 2, .. }));
    assert_eq!(err.failure_kind(), FailureKind::Fetch);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let url = format!("{}/missing", server.uri());
    let err = tokio::task::spawn_blocking(move || HttpTransport::new(&config)?.get_text(&url))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, HarvesterError::Fetch { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_rejects_empty_body() {
    let server = MockServer::start().await;
    mount_html(&server, "/empty", "  \n".to_string()).await;

    let config = config_for(&server);
    let url = format!("{}/empty", server.uri());
    let err = tokio::task::spawn_blocking(move || HttpTransport::new(&config)?.get_text(&url))
        .await
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().contains("empty response body"));
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_discovery_prefers_feed() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let config = config_for(&server);
    let catalog = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        discover_releases(&transport, &config)
    })
    .await
    .unwrap();

    let dates: Vec<String> = catalog.dates().iter().map(ToString::to_string).collect();
    assert_eq!(dates, vec!["2026-01-08", "2026-01-01"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_discovery_falls_back_to_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/h41.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_html(&server, "/releases/h41/", load_fixture("index.html")).await;

    let config = config_for(&server);
    let base = format!("{}/releases/h41", server.uri());
    let catalog = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        discover_releases(&transport, &config)
    })
    .await
    .unwrap();

    assert_eq!(catalog.len(), 3);
    let jan_8 = ReleaseDate::parse("2026-01-08").unwrap();
    assert_eq!(catalog.url_for(&jan_8), Some(format!("{base}/20260108/").as_str()));
    let jan_1 = ReleaseDate::parse("2026-01-01").unwrap();
    assert_eq!(
        catalog.url_for(&jan_1),
        Some(format!("{}/releases/h41/20260101/default.htm", server.uri()).as_str())
    );
}

// =============================================================================
// Pipeline
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_resolves_closest_release() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_releases(&server).await;

    let config = config_for(&server);
    let outcome = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        let requested = ReleaseDate::parse("2026-01-05").unwrap();
        harvest_with(&transport, &requested, &config)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(outcome.ok, "{:?}", outcome.warnings);
    assert_eq!(outcome.requested_date.as_str(), "2026-01-05");
    assert_eq!(outcome.resolved_date.as_str(), "2026-01-08");
    let report = outcome.report.unwrap();
    assert_eq!(report.meta.report_date.as_str(), "2026-01-08");
    assert_eq!(report.meta.week_ended.as_deref(), Some("2026-01-07"));
    assert!(report.meta.updated_at.is_some());
    assert_eq!(report.factors.supplying.len(), 13);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_without_catalog_fetches_canonical_url() {
    let server = MockServer::start().await;
    mount_releases(&server).await;

    let config = config_for(&server);
    let outcome = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        let requested = ReleaseDate::parse("2026-01-08").unwrap();
        harvest_with(&transport, &requested, &config)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(outcome.ok);
    assert_eq!(outcome.resolved_date.as_str(), "2026-01-08");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_unresolvable_date_is_resolution_failure() {
    let server = MockServer::start().await;

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        let requested = ReleaseDate::parse("2026-01-05").unwrap();
        harvest_with(&transport, &requested, &config)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Resolution);
    assert!(err.failure_kind().is_terminal());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_of_unreachable_release_is_fetch_failure() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    // Releases listed in the feed but not served.

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        let requested = ReleaseDate::parse("2026-01-08").unwrap();
        harvest_with(&transport, &requested, &config)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Fetch);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_compare_dates_runs_both_pipelines() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_releases(&server).await;

    let config = config_for(&server);
    let result = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config).unwrap();
        let from = ReleaseDate::parse("2026-01-01").unwrap();
        let to = ReleaseDate::parse("2026-01-08").unwrap();
        compare_dates_with(&transport, &from, &to, &config)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(result.ok);
    assert!(result.warnings.is_empty());
    let securities = &result.comparison.factors[0];
    assert_eq!(securities.label, "Securities held outright");
    assert_eq!(securities.change, Some(-10_000.0));
}

