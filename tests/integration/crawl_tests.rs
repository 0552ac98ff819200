//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use futures::StreamExt;
use glean::config::{Config, RetryConfig};
use glean::crawler::{FetchError, SkipReason};
use glean::url::ScopeRejection;
use glean::{crawl, CrawlEvent, Crawler, GleanError, TaskState};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration: no politeness delay, no robots, no backoff
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.delay_seconds = 0.0;
    config.crawler.timeout_seconds = 5;
    config.crawler.respect_robots = false;
    config.retry = RetryConfig {
        max_attempts: 2,
        base_delay_ms: 0,
        max_delay_ms: 0,
    };
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// An HTML page with a title, a paragraph and the given links
fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a> "#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><main><p>Content of {}.</p>{}</main></body></html>",
        title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(expected_fetches)
        .mount(server)
        .await;
}

/// Drains a crawler, failing the test on a fatal error
async fn collect_events(crawler: &mut Crawler) -> Vec<CrawlEvent> {
    let mut events = Vec::new();
    while let Some(event) = crawler.next_event().await {
        events.push(event.expect("crawl should not abort"));
    }
    events
}

fn document_paths(events: &[CrawlEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(CrawlEvent::as_document)
        .map(|doc| {
            url::Url::parse(&doc.source_url)
                .expect("documents carry absolute URLs")
                .path()
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_diamond_graph_fetches_shared_child_once() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/b", "/c"]), 1).await;
    mount_page(&server, "/b", page("B", &["/d"]), 1).await;
    mount_page(&server, "/c", page("C", &["/d", "/"]), 1).await;
    mount_page(&server, "/d", page("D", &["/b", "/c"]), 1).await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/", "/b", "/c", "/d"]);
    assert_eq!(crawler.visited().len(), 4);
    assert_eq!(crawler.frontier_len(), 0);
    assert_eq!(crawler.statistics().count(TaskState::Extracted), 4);
}

#[tokio::test]
async fn test_breadth_first_order_and_depths() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", page("A", &["/a1"]), 1).await;
    mount_page(&server, "/b", page("B", &["/b1"]), 1).await;
    mount_page(&server, "/a1", page("A1", &[]), 1).await;
    mount_page(&server, "/b1", page("B1", &[]), 1).await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/", "/a", "/b", "/a1", "/b1"]);
    let depths: Vec<u32> = events.iter().map(CrawlEvent::depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 2, 2]);

    let home = events[0].as_document().unwrap();
    assert_eq!(home.title, "Home");
    assert!(home.body_text.starts_with("Content of Home."));
}

#[tokio::test]
async fn test_max_depth_cutoff() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/1"]), 1).await;
    mount_page(&server, "/1", page("One", &["/2"]), 1).await;
    mount_page(&server, "/2", page("Two", &["/3"]), 0).await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/", "/1"]);
    assert!(events.iter().all(|e| e.depth() <= 1));
}

#[tokio::test]
async fn test_limits_bound_documents() {
    let server = MockServer::start().await;

    let children: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_page(&server, "/", page("Home", &child_refs), 1).await;
    for child in &children {
        Mock::given(method("GET"))
            .and(path(child.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(page(child, &["/deeper"]), "text/html"),
            )
            .mount(&server)
            .await;
    }
    mount_page(&server, "/deeper", page("Deeper", &[]), 0).await;

    let mut config = create_test_config();
    config.crawler.max_pages = 3;
    config.crawler.max_depth = 1;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    let documents: Vec<_> = events.iter().filter_map(CrawlEvent::as_document).collect();
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().all(|doc| doc.depth <= 1));
    assert_eq!(crawler.fetched_count(), 3);
    assert_eq!(crawler.frontier_len(), 8);
}

#[tokio::test]
async fn test_fragment_links_collapse_to_one_task() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/a", "/a#section"]), 1).await;
    mount_page(&server, "/a", page("A", &[]), 0).await;

    let mut config = create_test_config();
    config.crawler.max_pages = 1;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/"]);
    assert_eq!(crawler.frontier_len(), 1);
}

#[tokio::test]
async fn test_robots_disallow_skips_without_fetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", page("Home", &["/private/x", "/public"]), 1).await;
    mount_page(&server, "/private/x", page("Secret", &[]), 0).await;
    mount_page(&server, "/public", page("Public", &[]), 1).await;

    let mut config = create_test_config();
    config.crawler.respect_robots = true;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(events.len(), 3);
    match &events[1] {
        CrawlEvent::Skipped(skip) => {
            assert!(skip.url.ends_with("/private/x"));
            assert_eq!(skip.reason, SkipReason::Robots);
            assert_eq!(skip.depth, 1);
        }
        other => panic!("expected robots skip, got {:?}", other),
    }
    assert_eq!(document_paths(&events), vec!["/", "/public"]);
    assert_eq!(crawler.statistics().count(TaskState::SkippedRobots), 1);
}

#[tokio::test]
async fn test_robots_crawl_delay_spaces_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 0.3"))
        .mount(&server)
        .await;
    mount_page(&server, "/", page("Home", &["/next"]), 1).await;
    mount_page(&server, "/next", page("Next", &[]), 1).await;

    let mut config = create_test_config();
    config.crawler.respect_robots = true;

    let started = Instant::now();
    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/", "/next"]);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_configured_delay_spaces_requests() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/next"]), 1).await;
    mount_page(&server, "/next", page("Next", &[]), 1).await;

    let mut config = create_test_config();
    config.crawler.delay_seconds = 0.3;

    let started = Instant::now();
    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/", "/next"]);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/docs/", page("Docs", &["intro", "/docs"]), 1).await;
    mount_page(&server, "/docs/intro", page("Intro", &[]), 1).await;

    let mut crawler = Crawler::new(&format!("{}/docs", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/docs/", "/docs/intro"]);
    assert!(events.iter().all(|e| e.state() == TaskState::Extracted));
    assert!(crawler
        .visited()
        .contains(&glean::normalize(&format!("{}/docs/", server.uri()), None).unwrap()));
}

#[tokio::test]
async fn test_redirect_off_site_is_skipped() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/away", "/moved"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/landing", elsewhere.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&elsewhere, "/landing", page("Landing", &["/further"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/"))
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/"]);
    assert_eq!(events.len(), 3);
    match &events[1] {
        CrawlEvent::Skipped(skip) => {
            assert!(skip.url.ends_with("/away"));
            assert_eq!(skip.reason, SkipReason::Scope(ScopeRejection::ForeignHost));
        }
        other => panic!("expected off-site skip, got {:?}", other),
    }
    match &events[2] {
        CrawlEvent::Skipped(skip) => {
            assert!(skip.url.ends_with("/moved"));
            assert_eq!(skip.reason, SkipReason::Scope(ScopeRejection::AlreadyVisited));
        }
        other => panic!("expected duplicate skip, got {:?}", other),
    }
}

#[tokio::test]
async fn test_seed_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();

    match crawler.next_event().await {
        Some(Err(GleanError::SeedUnreachable { url, reason })) => {
            assert!(url.starts_with(&server.uri()));
            assert_eq!(reason, "HTTP 404");
        }
        other => panic!("expected fatal seed error, got {:?}", other.map(|r| r.is_ok())),
    }
    assert!(crawler.next_event().await.is_none());
}

#[tokio::test]
async fn test_failed_child_is_reported_and_crawl_continues() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/broken", "/fine"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/fine", page("Fine", &["/gone"]), 1).await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    let failures: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::Failed(fail) => Some(fail),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].url.ends_with("/broken"));
    assert_eq!(failures[0].error, FetchError::Http { status: 503 });
    assert_eq!(failures[0].attempts, 2);
    assert!(failures[1].url.ends_with("/gone"));
    assert_eq!(failures[1].attempts, 1);

    assert_eq!(document_paths(&events), vec!["/", "/fine"]);
    assert_eq!(crawler.statistics().failures.len(), 2);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", page("Home", &[]), 1).await;

    let mut config = create_test_config();
    config.retry.max_attempts = 3;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/"]);
}

#[tokio::test]
async fn test_scope_rules_filter_links() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/docs/",
        page(
            "Docs",
            &[
                "/docs/guide",
                "/blog/post",
                "/docs/login",
                "/docs/manual.pdf",
                "https://elsewhere.example/docs/page",
            ],
        ),
        1,
    )
    .await;
    mount_page(&server, "/docs/guide", page("Guide", &[]), 1).await;
    mount_page(&server, "/blog/post", page("Post", &[]), 0).await;
    mount_page(&server, "/docs/login", page("Login", &[]), 0).await;

    let mut config = create_test_config();
    config.crawler.url_pattern = Some("/docs/".to_string());

    let mut crawler =
        Crawler::new(&format!("{}/docs/", server.uri()), &config).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(document_paths(&events), vec!["/docs/", "/docs/guide"]);

    let rejected = &crawler.statistics().rejected_links;
    assert_eq!(rejected.get(&ScopeRejection::PatternMismatch), Some(&1));
    assert_eq!(rejected.get(&ScopeRejection::NonContent), Some(&2));
    assert_eq!(rejected.get(&ScopeRejection::ForeignHost), Some(&1));
}

#[tokio::test]
async fn test_non_html_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/feed"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"items": []}"#.to_string(), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = Crawler::new(&format!("{}/", server.uri()), &create_test_config()).unwrap();
    let events = collect_events(&mut crawler).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].state(), TaskState::SkippedContent);
}

#[tokio::test]
async fn test_crawl_stream() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/about"]), 1).await;
    mount_page(&server, "/about", page("About", &[]), 1).await;

    let events: Vec<_> = crawl(&format!("{}/", server.uri()), &create_test_config())
        .unwrap()
        .collect()
        .await;

    let titles: Vec<String> = events
        .into_iter()
        .map(|event| event.unwrap())
        .filter_map(|event| match event {
            CrawlEvent::Document(doc) => Some(doc.title),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["Home", "About"]);
}

#[tokio::test]
async fn test_crawl_rejects_invalid_setup() {
    assert!(matches!(
        crawl("mailto:someone@example.com", &create_test_config()),
        Err(GleanError::Url(_))
    ));

    let mut config = create_test_config();
    config.retry.max_attempts = 0;
    assert!(matches!(
        crawl("https://example.com/", &config),
        Err(GleanError::Config(_))
    ));
}

#[tokio::test]
async fn test_independent_runs_share_nothing() {
    let server = MockServer::start().await;

    mount_page(&server, "/", page("Home", &["/x"]), 2).await;
    mount_page(&server, "/x", page("X", &[]), 2).await;

    let seed = format!("{}/", server.uri());
    let mut first = Crawler::new(&seed, &create_test_config()).unwrap();
    let mut second = Crawler::new(&seed, &create_test_config()).unwrap();

    let first_events = collect_events(&mut first).await;
    let second_events = collect_events(&mut second).await;

    assert_eq!(document_paths(&first_events), document_paths(&second_events));
}
