//! Integration tests for the retrying fetcher.
//!
//! Delays are scaled down to milliseconds; the properties checked are the
//! relative ordering of the two backoff delays and the attempt budget.

mod support;

use std::time::{Duration, Instant};

use gb_mirror_core::{ApiClient, BackoffPolicy, FetchError};
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RETRY_DELAY: Duration = Duration::from_millis(10);
const RATE_LIMIT_DELAY: Duration = Duration::from_millis(300);

fn client(max_attempts: u32) -> ApiClient {
    ApiClient::new(BackoffPolicy::new(max_attempts, RETRY_DELAY, RATE_LIMIT_DELAY))
}

/// Mounts a failure that answers once, shadowing a success response.
async fn mount_fail_then_ok(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "OK", "results": []})),
        )
        .mount(server)
        .await;
}

// ==================== Backoff Distinction Tests ====================

#[tokio::test]
async fn test_rate_limit_status_waits_long_delay() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_fail_then_ok(&mock_server, 420).await;

    let start = Instant::now();
    let body = client(3)
        .fetch_json(&format!("{}/api/games/", mock_server.uri()), &[])
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(body["error"], "OK");
    assert!(
        elapsed >= RATE_LIMIT_DELAY,
        "420 should back off with the rate-limit delay, took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited_too() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_fail_then_ok(&mock_server, 429).await;

    let start = Instant::now();
    client(3)
        .fetch_json(&format!("{}/api/games/", mock_server.uri()), &[])
        .await
        .unwrap();

    assert!(start.elapsed() >= RATE_LIMIT_DELAY);
}

#[tokio::test]
async fn test_server_error_waits_short_delay() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_fail_then_ok(&mock_server, 500).await;

    let start = Instant::now();
    let body = client(3)
        .fetch_json(&format!("{}/api/games/", mock_server.uri()), &[])
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(body["error"], "OK");
    assert!(elapsed >= RETRY_DELAY);
    assert!(
        elapsed < RATE_LIMIT_DELAY,
        "500 must not use the rate-limit delay, took {elapsed:?}"
    );
}

// ==================== Attempt Budget Tests ====================

#[tokio::test]
async fn test_persistent_failure_exhausts_budget() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let error = client(3)
        .fetch_json(
            &format!("{}/api/games/", mock_server.uri()),
            &[("api_key", "s3cret".to_string()), ("format", "json".to_string())],
        )
        .await
        .unwrap_err();

    match &error {
        FetchError::Exhausted { url, attempts, .. } => {
            assert_eq!(*attempts, 3);
            assert!(url.contains("api_key=REDACTED"));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert!(!error.to_string().contains("s3cret"));
}

#[tokio::test]
async fn test_mixed_failures_share_one_budget() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let error = ApiClient::new(BackoffPolicy::new(
        2,
        Duration::from_millis(1),
        Duration::from_millis(1),
    ))
    .fetch_json(&format!("{}/api/games/", mock_server.uri()), &[])
    .await
    .unwrap_err();

    assert!(matches!(error, FetchError::Exhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/games/"))
        .and(query_param("api_key", "k"))
        .and(query_param("format", "json"))
        .and(query_param("offset", "200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "OK", "results": [1]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = client(1)
        .fetch_json(
            &format!("{}/api/games/", mock_server.uri()),
            &[
                ("api_key", "k".to_string()),
                ("format", "json".to_string()),
                ("offset", "200".to_string()),
            ],
        )
        .await
        .unwrap();

    assert_eq!(body["results"], json!([1]));
}
