//! Integration tests for the fetch pipeline
//!
//! These tests use wiremock to stand up real HTTP servers and drive the
//! Fetcher end-to-end through its reqwest client.

use paperclip::config::{parse_config, Config};
use paperclip::fetch::{FetchOutcome, Fetcher, Rejection};
use paperclip::metrics::FailureKind;
use paperclip::policy::{RetryPolicy, SourcePolicy, TermsPolicy};
use paperclip::PaperclipError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a source policy with tiny backoffs suitable for tests
fn test_policy(name: &str, user_agent: &str, rate_limit: u32, max_attempts: u32) -> SourcePolicy {
    SourcePolicy::new(
        name,
        user_agent,
        rate_limit,
        RetryPolicy::new(max_attempts, 0.01, 0.02),
        TermsPolicy::permissive(),
    )
}

fn build_fetcher(policies: Vec<SourcePolicy>) -> Fetcher {
    let map: HashMap<String, SourcePolicy> = policies
        .into_iter()
        .map(|policy| (policy.name.clone(), policy))
        .collect();
    Fetcher::new(map).expect("Failed to build fetcher")
}

/// Mounts a robots.txt that allows everything
async fn mount_open_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_fetch_returns_body() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/papers/1"))
        .and(header("user-agent", "PaperclipBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("arxiv", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/papers/1", mock_server.uri());

    let result = fetcher
        .fetch(&url, "arxiv")
        .await
        .expect("Fetch failed")
        .into_result()
        .expect("Expected a result");

    assert_eq!(result.url, url);
    assert_eq!(result.status_code, 200);
    assert_eq!(result.content, b"%PDF-1.7");
    assert_eq!(fetcher.metrics().snapshot().successes, 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_second_fetch() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("feed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("arxiv", "PaperclipBot/1.0", 1, 3)]);
    let url = format!("{}/query", mock_server.uri());

    let first = fetcher.fetch(&url, "arxiv").await.expect("Fetch failed");
    assert!(first.is_fetched());

    let second = fetcher.fetch(&url, "arxiv").await.expect("Fetch failed");
    match second.rejection() {
        Some(Rejection::RateLimited { retry_after, .. }) => {
            assert!(
                *retry_after > Duration::from_secs(58) && *retry_after <= Duration::from_secs(60),
                "unexpected retry_after {:?}",
                retry_after
            );
        }
        other => panic!("Expected rate limit rejection, got {:?}", other),
    }

    let snapshot = fetcher.metrics().snapshot();
    assert_eq!(snapshot.last_failure_kind, Some(FailureKind::RateLimited));
    assert!(snapshot
        .last_failure_reason
        .unwrap()
        .starts_with("Rate limit exceeded for arxiv, retry after "));
}

#[tokio::test]
async fn test_robots_disallow_prevents_primary_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Should never be called
    Mock::given(method("GET"))
        .and(path("/admin/export"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("crossref", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/admin/export", mock_server.uri());

    let outcome = fetcher.fetch(&url, "crossref").await.expect("Fetch failed");
    assert_eq!(
        outcome,
        FetchOutcome::Rejected(Rejection::RobotsDisallowed { url: url.clone() })
    );
    assert_eq!(fetcher.metrics().snapshot().failures, 1);
}

#[tokio::test]
async fn test_server_errors_then_success() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    // First two attempts fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("crossref", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/works", mock_server.uri());

    let result = fetcher
        .fetch(&url, "crossref")
        .await
        .expect("Fetch failed")
        .into_result()
        .expect("Expected a result");
    assert_eq!(result.status_code, 200);
    assert_eq!(result.content, b"ok");

    let snapshot = fetcher.metrics().snapshot();
    assert_eq!(snapshot.retries, 2);
    assert_eq!(snapshot.failures, 2);
    assert_eq!(snapshot.successes, 1);
}

#[tokio::test]
async fn test_retry_budget_exhaustion() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/graph"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("s2", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/graph", mock_server.uri());

    let outcome = fetcher.fetch(&url, "s2").await.expect("Fetch failed");
    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::ServerError {
            status: 503,
            url: url.clone()
        })
    );

    let snapshot = fetcher.metrics().snapshot();
    assert_eq!(snapshot.failures, 3);
    assert_eq!(snapshot.retries, 2);
    assert_eq!(snapshot.last_failure_reason, Some(format!("HTTP 503 for {}", url)));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("arxiv", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/missing", mock_server.uri());

    let outcome = fetcher.fetch(&url, "arxiv").await.expect("Fetch failed");
    assert_eq!(outcome.rejection().map(Rejection::kind), Some(FailureKind::HttpStatus));
    assert_eq!(fetcher.metrics().snapshot().retries, 0);
}

#[tokio::test]
async fn test_robots_failure_fails_open_and_is_cached() {
    let mock_server = MockServer::start().await;

    // robots.txt errors once; the checker must not ask again
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![test_policy("arxiv", "PaperclipBot/1.0", 10, 3)]);
    let url = format!("{}/data", mock_server.uri());

    assert!(fetcher.fetch(&url, "arxiv").await.expect("Fetch failed").is_fetched());
    assert!(fetcher.fetch(&url, "arxiv").await.expect("Fetch failed").is_fetched());
}

#[tokio::test]
async fn test_robots_evaluated_per_source_user_agent() {
    let mock_server = MockServer::start().await;

    // Each source has its own checker, so robots.txt is fetched once per source
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: BlockedBot\nDisallow: /\n\nUser-agent: *\nAllow: /"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/paper"))
        .respond_with(ResponseTemplate::new(200).set_body_string("paper"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = build_fetcher(vec![
        test_policy("blocked", "BlockedBot/2.0", 10, 3),
        test_policy("polite", "PaperclipBot/1.0", 10, 3),
    ]);
    let url = format!("{}/paper", mock_server.uri());

    let blocked = fetcher.fetch(&url, "blocked").await.expect("Fetch failed");
    assert_eq!(blocked.rejection().map(Rejection::kind), Some(FailureKind::RobotsDisallowed));

    let polite = fetcher.fetch(&url, "polite").await.expect("Fetch failed");
    assert!(polite.is_fetched());
}

#[tokio::test]
async fn test_terms_policy_blocks_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut policy = test_policy("crossref", "PaperclipBot/1.0", 10, 3);
    policy.terms_policy = TermsPolicy::new(Vec::<String>::new(), ["api.crossref.org"]);
    let fetcher = build_fetcher(vec![policy]);

    let outcome = fetcher
        .fetch(&format!("{}/works", mock_server.uri()), "crossref")
        .await
        .expect("Fetch failed");
    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::PolicyViolation {
            domain: "127.0.0.1".to_string()
        })
    );
}

#[tokio::test]
async fn test_unknown_source_fails_loudly() {
    let fetcher = build_fetcher(vec![test_policy("arxiv", "PaperclipBot/1.0", 10, 3)]);

    let result = fetcher.fetch("https://export.arxiv.org/api/query", "pubmed").await;
    assert!(matches!(result, Err(PaperclipError::UnknownSource(ref name)) if name == "pubmed"));
}

#[tokio::test]
async fn test_concurrent_fetches_respect_rate_limit() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string("item"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = Arc::new(build_fetcher(vec![test_policy("s2", "PaperclipBot/1.0", 3, 1)]));
    let url = format!("{}/item", mock_server.uri());

    let mut handles = Vec::new();
    for _ in 0..10 {
        let fetcher = Arc::clone(&fetcher);
        let url = url.clone();
        handles.push(tokio::spawn(async move { fetcher.fetch(&url, "s2").await }));
    }

    let mut fetched = 0;
    for handle in handles {
        let outcome = handle.await.expect("Task panicked").expect("Fetch failed");
        if outcome.is_fetched() {
            fetched += 1;
        }
    }

    assert_eq!(fetched, 3);
    let snapshot = fetcher.metrics().snapshot();
    assert_eq!(snapshot.successes, 3);
    assert_eq!(snapshot.failures, 7);
}

#[tokio::test]
async fn test_from_config_writes_failure_log() {
    let mock_server = MockServer::start().await;
    mount_open_robots(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log_path = dir.path().join("failures.log");

    let config: Config = parse_config(&format!(
        r#"
[fetcher]
failure-log-path = "{}"

[[source]]
name = "arxiv"
user-agent = "PaperclipBot/1.0"
rate-limit-per-minute = 10

[source.retry]
max-attempts = 2
base-backoff-seconds = 0.01
max-backoff-seconds = 0.01
"#,
        log_path.display()
    ))
    .expect("Invalid config");

    let fetcher = Fetcher::from_config(&config).expect("Failed to build fetcher");
    let url = format!("{}/flaky", mock_server.uri());

    let outcome = fetcher.fetch(&url, "arxiv").await.expect("Fetch failed");
    assert!(!outcome.is_fetched());

    let log = std::fs::read_to_string(&log_path).expect("Failure log missing");
    let expected = format!("HTTP 502 for {url}\nHTTP 502 for {url}\n", url = url);
    assert_eq!(log, expected);
}
