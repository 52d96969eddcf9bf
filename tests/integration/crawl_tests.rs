//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. Mocks declared with `.expect(n)` are
//! verified when the server is dropped, which is how "fetched exactly once"
//! and "never fetched" are asserted.

use endpoint_ripple::config::{parse_headers, Config};
use endpoint_ripple::crawler::{
    extract_endpoints, run_crawl, Coordinator, CrawlReport, Fetcher, ScriptCollector,
};
use endpoint_ripple::state::{PageStatus, VisitedSet};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given depth budget
fn create_test_config(depth: i64) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = depth;
    config.crawler.request_timeout_secs = 5;
    config.crawler.retry_delay_ms = 10;
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn js_file(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "application/javascript")
}

async fn mount_page(server: &MockServer, route: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn crawl(server: &MockServer, config: Config) -> CrawlReport {
    run_crawl(config, &format!("{}/", server.uri()))
        .await
        .expect("crawl should start")
}

#[tokio::test]
async fn test_anchor_endpoint_found_at_depth_one() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/api/v1/users">Users</a>"#,
        1,
    )
    .await;

    // Depth 1 never follows links
    mount_page(&mock_server, "/api/v1/users", "[]", 0).await;

    let report = crawl(&mock_server, create_test_config(1)).await;

    assert!(
        report
            .endpoints
            .contains(&format!("{}/api/v1/users", base_url)),
        "endpoints: {:?}",
        report.endpoints
    );
    assert_eq!(report.statistics.total_pages(), 1);
    assert_eq!(report.visited, vec![format!("{}/", base_url)]);
}

#[tokio::test]
async fn test_inline_script_endpoint_found() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<script>fetch('/api/data?x=1').then(r => r.json());</script>"#,
        1,
    )
    .await;

    let report = crawl(&mock_server, create_test_config(1)).await;
    assert!(report
        .endpoints
        .contains(&format!("{}/api/data?x=1", base_url)));
}

#[tokio::test]
async fn test_linked_script_endpoint_found() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<script src="/static/app.js"></script>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/static/app.js"))
        .respond_with(js_file(
            "const load = () => fetch('/api/data?x=1'); const cdn = \"https://cdn.other.test/v2/lib\";",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&mock_server, create_test_config(1)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/data?x=1", base_url)));
    assert!(report.endpoints.contains("https://cdn.other.test/v2/lib"));
    assert_eq!(report.statistics.total_scripts(), 1);
}

#[tokio::test]
async fn test_failed_script_does_not_abort_extraction() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/api/from-page">x</a>
           <script src="/missing.js"></script>
           <script src="/present.js"></script>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing.js"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/present.js"))
        .respond_with(js_file("axios.get(\"/api/from-script\")"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&mock_server, create_test_config(1)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/from-page", base_url)));
    assert!(report
        .endpoints
        .contains(&format!("{}/api/from-script", base_url)));
    assert_eq!(report.statistics.total_scripts(), 2);
    assert_eq!(report.statistics.failed_scripts(), 1);
    assert_eq!(
        report.statistics.scripts_by_status.get(&PageStatus::DeadLink),
        Some(&1)
    );
}

#[tokio::test]
async fn test_cyclic_links_fetch_each_page_once() {
    let mock_server = MockServer::start().await;

    // "/" -> "/a", "/b"; "/a" -> "/b", "/"; "/b" -> "/a", "/c"; "/c" -> "/"
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/#top">Top</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#, 1).await;
    mount_page(&mock_server, "/b", r#"<a href="/a">A</a><a href="/c">C</a>"#, 1).await;
    mount_page(&mock_server, "/c", r#"<a href="/">Home</a><a href="/c">Self</a>"#, 1).await;

    let report = crawl(&mock_server, create_test_config(10)).await;

    assert_eq!(report.statistics.total_pages(), 4);
    assert_eq!(report.visited.len(), 4);
}

#[tokio::test]
async fn test_fragment_variants_fetch_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/doc#intro">1</a><a href="/doc#usage">2</a><a href="/doc">3</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/doc", "docs", 1).await;

    let report = crawl(&mock_server, create_test_config(2)).await;
    assert_eq!(report.statistics.total_pages(), 2);
}

#[tokio::test]
async fn test_foreign_origin_never_fetched() {
    let mock_server = MockServer::start().await;
    let foreign_server = MockServer::start().await;
    let foreign_url = foreign_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/local">Local</a><a href="{}/api/external">External</a>"#,
            foreign_url
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/local", "local page", 1).await;

    Mock::given(method("GET"))
        .respond_with(html_page("should never be fetched"))
        .expect(0)
        .mount(&foreign_server)
        .await;

    let report = crawl(&mock_server, create_test_config(3)).await;

    // Foreign URLs still count as endpoints; they are just never crawled
    assert!(report
        .endpoints
        .contains(&format!("{}/api/external", foreign_url)));
    assert_eq!(report.statistics.total_pages(), 2);
}

#[tokio::test]
async fn test_depth_two_stops_before_third_hop() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/b">B</a><script>fetch("/api/from-a")</script>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/b",
        r#"<a href="/c">C</a><script>fetch("/api/from-b")</script>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/c",
        r#"<script>fetch("/api/from-c")</script>"#,
        0,
    )
    .await;

    let report = crawl(&mock_server, create_test_config(2)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/from-a", base_url)));
    assert!(report
        .endpoints
        .contains(&format!("{}/api/from-b", base_url)));
    assert!(!report
        .endpoints
        .contains(&format!("{}/api/from-c", base_url)));
}

#[tokio::test]
async fn test_depth_three_reaches_third_hop() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/b">B</a>"#, 1).await;
    mount_page(&mock_server, "/b", r#"<a href="/c">C</a>"#, 1).await;
    mount_page(
        &mock_server,
        "/c",
        r#"<script>fetch("/api/from-c")</script>"#,
        1,
    )
    .await;

    let report = crawl(&mock_server, create_test_config(3)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/from-c", base_url)));
    assert_eq!(report.statistics.deepest_level, 2);
}

#[tokio::test]
async fn test_zero_and_negative_depth_fetch_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_page(r#"<a href="/api/x">x</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    for depth in [0, -1, -100] {
        let report = crawl(&mock_server, create_test_config(depth)).await;
        assert!(report.endpoints.is_empty());
        assert!(report.visited.is_empty());
    }
}

#[tokio::test]
async fn test_failed_seed_yields_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&mock_server, create_test_config(3)).await;

    assert!(report.endpoints.is_empty());
    assert_eq!(report.statistics.failed_pages(), 1);
    assert_eq!(
        report.statistics.pages_by_status.get(&PageStatus::HttpError),
        Some(&1)
    );
}

#[tokio::test]
async fn test_failed_page_does_not_stop_siblings() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/broken">1</a><a href="/works">2</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/works",
        r#"<script>fetch("/api/sibling")</script>"#,
        1,
    )
    .await;

    let report = crawl(&mock_server, create_test_config(2)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/sibling", base_url)));
    assert_eq!(report.statistics.total_pages(), 3);
    assert_eq!(report.statistics.failed_pages(), 1);
}

#[tokio::test]
async fn test_shared_script_fetched_once_per_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/other">O</a><script src="/app.js"></script>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/other",
        r#"<script src="/app.js"></script>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(js_file("fetch('/api/shared')"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&mock_server, create_test_config(2)).await;

    assert!(report
        .endpoints
        .contains(&format!("{}/api/shared", base_url)));
    assert_eq!(report.statistics.total_scripts(), 1);
    assert_eq!(report.statistics.scripts_skipped, 1);
}

#[tokio::test]
async fn test_custom_headers_sent_with_every_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("x-api-key", "secret"))
        .and(header("user-agent", "CustomBot"))
        .respond_with(html_page(r#"<script src="/app.js"></script>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.js"))
        .and(header("x-api-key", "secret"))
        .respond_with(js_file("fetch('/api/authed')"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(1);
    config.headers =
        parse_headers(r#"{"X-Api-Key": "secret", "User-Agent": "CustomBot"}"#).unwrap();

    let report = crawl(&mock_server, config).await;
    assert_eq!(report.statistics.failed_pages(), 0);
    assert_eq!(report.statistics.failed_scripts(), 0);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", r#"<a href="/api/after-retry">x</a>"#, 1).await;

    let mut config = create_test_config(1);
    config.crawler.retries = 2;

    let report = crawl(&mock_server, config).await;
    assert!(report
        .endpoints
        .contains(&format!("{}/api/after-retry", base_url)));
    assert_eq!(report.statistics.total_pages(), 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(1);
    config.crawler.retries = 3;

    let report = crawl(&mock_server, config).await;
    assert_eq!(
        report.statistics.pages_by_status.get(&PageStatus::DeadLink),
        Some(&1)
    );
}

#[tokio::test]
async fn test_page_cap_limits_total_fetches() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/p1", "one", 1).await;
    mount_page(&mock_server, "/p2", "two", 0).await;
    mount_page(&mock_server, "/p3", "three", 0).await;

    let mut config = create_test_config(2);
    config.crawler.max_pages = 2;

    let report = crawl(&mock_server, config).await;
    assert_eq!(report.statistics.total_pages(), 2);
    assert_eq!(report.statistics.links_over_limit, 2);
}

#[tokio::test]
async fn test_slow_page_times_out_without_failing_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">S</a><a href="/fast">F</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("late").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", "fast", 1).await;

    let mut config = create_test_config(2);
    config.crawler.request_timeout_secs = 1;

    let report = crawl(&mock_server, config).await;
    assert_eq!(report.statistics.total_pages(), 3);
    assert_eq!(
        report.statistics.pages_by_status.get(&PageStatus::Unreachable),
        Some(&1)
    );
}

#[tokio::test]
async fn test_every_endpoint_is_absolute_with_path() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="https://bare-host.test">bare</a>
           <a href="/api/list?page=2&size=10">list</a>
           <img src="//cdn.other.test/img/logo.png">
           <script>var x = "https://query-only.test?x=1";</script>"#,
        1,
    )
    .await;

    let report = crawl(&mock_server, create_test_config(1)).await;

    assert!(!report.endpoints.is_empty());
    for endpoint in report.endpoints.iter() {
        let url = Url::parse(endpoint).expect("endpoint must be absolute");
        assert!(url.host_str().is_some_and(|h| !h.is_empty()));
        assert!(!url.path().is_empty());
        assert!(!endpoint.contains("bare-host.test"));
        assert!(!endpoint.contains("query-only.test"));
    }
    assert!(report
        .endpoints
        .contains("http://cdn.other.test/img/logo.png"));
}

#[tokio::test]
async fn test_coordinator_reports_visited_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/next">N</a>"#, 1).await;
    mount_page(&mock_server, "/next", "end", 1).await;

    let coordinator = Coordinator::new(create_test_config(2)).unwrap();
    let seed = Url::parse(&format!("{}/", base_url)).unwrap();
    let report = coordinator.crawl(&seed, 2).await;

    assert_eq!(
        report.visited,
        vec![format!("{}/", base_url), format!("{}/next", base_url)]
    );
    assert!(coordinator.visited().contains(&seed));
}

async fn mount_script(
    server: &MockServer,
    route: &str,
    response: ResponseTemplate,
    expected_hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn script_urls(server: &MockServer, routes: &[&str]) -> Vec<Url> {
    routes
        .iter()
        .map(|route| Url::parse(&format!("{}{}", server.uri(), route)).unwrap())
        .collect()
}

#[tokio::test]
async fn test_script_bodies_joined_in_markup_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The first script finishes last
    mount_script(
        &mock_server,
        "/a.js",
        js_file("goto /api/x").set_delay(Duration::from_millis(300)),
        1,
    )
    .await;
    mount_script(&mock_server, "/b.js", js_file("/y next"), 1).await;
    mount_script(&mock_server, "/c.js", js_file("done"), 1).await;

    let config = create_test_config(1);
    let fetcher = Fetcher::new(&config).unwrap();
    let seen = VisitedSet::new();
    let collector = ScriptCollector::new(&fetcher, &seen, 4);
    let page = Url::parse(&format!("{}/", base_url)).unwrap();

    let bundle = collector
        .collect_sources(&script_urls(&mock_server, &["/a.js", "/b.js", "/c.js"]), &page)
        .await;

    assert_eq!(bundle.content, "goto /api/x\n/y next\ndone\n");
    assert_eq!(bundle.fetched(), 3);

    let found = extract_endpoints(&bundle.content, &page);
    assert!(found.contains(&format!("{}/api/x", base_url)));
    assert!(found.contains(&format!("{}/y", base_url)));
    assert!(!found.contains(&format!("{}/api/x/y", base_url)));
}

#[tokio::test]
async fn test_failed_script_in_middle_contributes_nothing() {
    let mock_server = MockServer::start().await;

    mount_script(&mock_server, "/first.js", js_file("first"), 1).await;
    mount_script(&mock_server, "/broken.js", ResponseTemplate::new(500), 1).await;
    mount_script(&mock_server, "/last.js", js_file("last"), 1).await;

    let config = create_test_config(1);
    let fetcher = Fetcher::new(&config).unwrap();
    let seen = VisitedSet::new();
    let collector = ScriptCollector::new(&fetcher, &seen, 4);
    let page = Url::parse(&format!("{}/", mock_server.uri())).unwrap();

    let bundle = collector
        .collect_sources(
            &script_urls(&mock_server, &["/first.js", "/broken.js", "/last.js"]),
            &page,
        )
        .await;

    assert_eq!(bundle.content, "first\nlast\n");
    let statuses: Vec<PageStatus> = bundle.outcomes.iter().map(|(_, s)| *s).collect();
    assert_eq!(
        statuses,
        vec![
            PageStatus::Processed,
            PageStatus::HttpError,
            PageStatus::Processed
        ]
    );
    assert_eq!(bundle.failed(), 1);
}

#[tokio::test]
async fn test_script_refetched_for_page_of_other_scheme() {
    let mock_server = MockServer::start().await;
    mount_script(&mock_server, "/app.js", js_file("fetch('/api/shared')"), 2).await;

    let config = create_test_config(1);
    let fetcher = Fetcher::new(&config).unwrap();
    let seen = VisitedSet::new();
    let collector = ScriptCollector::new(&fetcher, &seen, 4);
    let scripts = script_urls(&mock_server, &["/app.js"]);

    let http_page = Url::parse("http://site.test/").unwrap();
    let https_page = Url::parse("https://site.test/about").unwrap();

    let first = collector.collect_sources(&scripts, &http_page).await;
    let second = collector.collect_sources(&scripts, &https_page).await;
    let third = collector.collect_sources(&scripts, &http_page).await;

    assert!(extract_endpoints(&first.content, &http_page).contains("http://site.test/api/shared"));
    assert!(
        extract_endpoints(&second.content, &https_page).contains("https://site.test/api/shared")
    );
    assert_eq!(third.skipped, 1);
    assert!(third.content.is_empty());
}
