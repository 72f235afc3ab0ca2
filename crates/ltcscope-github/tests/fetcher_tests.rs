// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-level tests for pagination, retry and rate-limit handling.

use std::sync::Arc;
use std::time::Duration;

use ltcscope_core::{ListingSource, LtcError, RetryPolicy};
use ltcscope_github::{GithubClient, RateLimiter};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, quota_max_failures: u32) -> GithubClient {
    let limiter = Arc::new(RateLimiter::new(
        &server.uri(),
        Duration::ZERO,
        quota_max_failures,
    ));
    GithubClient::new(None, limiter, 100, Duration::from_secs(5)).unwrap()
}

async fn mount_quota(server: &MockServer, remaining: u64) {
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rate": {"limit": 5000, "remaining": remaining, "reset": 0}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn listing_follows_next_links() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    let next = format!("<{}/repos/o/r/commits?page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/o/r/commits"))
        .and(query_param("per_page", "100"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([{"sha": "a"}, {"sha": "b"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"sha": "c"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let url = format!("{}/repos/o/r/commits{{/sha}}", server.uri());
    let listing = client.fetch_listing(&url, RetryPolicy::NONE).await.unwrap();

    assert!(!listing.truncated);
    let shas: Vec<_> = listing
        .items
        .iter()
        .map(|v| v["sha"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(shas, ["a", "b", "c"]);
}

#[tokio::test]
async fn failed_page_ends_stream_with_partial_results() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    let next = format!("<{}/items?page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let listing = client
        .fetch_listing(&format!("{}/items", server.uri()), RetryPolicy::NONE)
        .await
        .unwrap();

    assert!(listing.truncated);
    assert_eq!(listing.items, vec![json!({"id": 1})]);
}

#[tokio::test]
async fn transient_failure_is_retried_per_policy() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"created_at": "2015-01-01T00:00:00Z"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let url = format!("{}/users/alice", server.uri());

    let profile = client
        .fetch_object(&url, RetryPolicy::fixed(2, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(profile.unwrap()["created_at"], "2015-01-01T00:00:00Z");
}

#[tokio::test]
async fn object_request_gives_up_after_retries() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let profile = client
        .fetch_object(
            &format!("{}/users/ghost", server.uri()),
            RetryPolicy::fixed(2, Duration::ZERO),
        )
        .await
        .unwrap();
    assert!(profile.is_none());
}

#[tokio::test]
async fn exhausted_quota_waits_and_retries_same_page() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "0"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"event": "closed"}])))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let listing = client
        .fetch_listing(&format!("{}/events", server.uri()), RetryPolicy::NONE)
        .await
        .unwrap();

    assert!(!listing.truncated);
    assert_eq!(listing.items.len(), 1);
}

#[tokio::test]
async fn quota_is_fetched_once_and_shared_between_clones() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rate": {"remaining": 100, "reset": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let other = client.clone();
    let url = format!("{}/items", server.uri());
    let (a, b) = tokio::join!(
        client.fetch_listing(&url, RetryPolicy::NONE),
        other.fetch_listing(&url, RetryPolicy::NONE)
    );
    assert!(a.unwrap().is_empty());
    assert!(b.unwrap().is_empty());

    let cached = client.limiter().cached().await.unwrap();
    assert_eq!(cached.remaining, 98);
}

#[tokio::test]
async fn failing_quota_query_surfaces_rate_limit_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let err = client
        .fetch_listing(&format!("{}/items", server.uri()), RetryPolicy::NONE)
        .await
        .unwrap_err();
    assert!(matches!(err, LtcError::RateLimit(_)));
}

#[tokio::test]
async fn search_pages_are_unwrapped_and_followed() {
    let server = MockServer::start().await;
    mount_quota(&server, 5000).await;

    let next = format!(
        "<{}/search/repositories?q=stars%3A%3E3000&page=2>; rel=\"next\"",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "stars:>3000"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!({
                    "total_count": 3,
                    "incomplete_results": false,
                    "items": [{"id": 1}, {"id": 2}]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 3,
            "incomplete_results": false,
            "items": [{"id": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let url = format!("{}/search/repositories?q=stars%3A%3E3000", server.uri());
    let listing = client.fetch_listing(&url, RetryPolicy::NONE).await.unwrap();
    assert!(!listing.truncated);
    let ids: Vec<i64> = listing.items.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
