//! Route Rate Limit Tests
//!
//! Exercises the throttle middleware through the real router with a
//! manually driven clock, so window rollover is checked without sleeping.
//!
//! Route policies under test:
//! - GET /employees      counts against `long` (100 per 60s)
//! - GET /employees/:id  counts against `short` overridden to 1 per 1s
//! - everything else     exempt

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use employee_service::employees::{EmployeeService, InMemoryEmployeeRepository};
use employee_service::http_server::{HttpServer, HttpServerConfig};
use employee_service::rate_limit::{MockClock, RateLimitConfig};

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    router: Router,
    clock: MockClock,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    fn with_config(rate_limit: RateLimitConfig) -> Self {
        let clock = MockClock::default();
        let router = HttpServer::with_clock(
            HttpServerConfig::default(),
            EmployeeService::new(Arc::new(InMemoryEmployeeRepository::new())),
            &rate_limit,
            Arc::new(clock.clone()),
        )
        .router();
        Self { router, clock }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        peer: [u8; 4],
        forwarded_for: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(forwarded) = forwarded_for {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let mut request = builder.body(body).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 50000))));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        self.call(Method::GET, uri, None, CLIENT_A, None).await
    }

    async fn seed(&self) {
        let (status, _, _) = self
            .call(
                Method::POST,
                "/employees",
                Some(json!({ "name": "Ada", "email": "ada@example.com", "role": "ENGINEER" })),
                CLIENT_A,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

const CLIENT_A: [u8; 4] = [10, 0, 0, 1];
const CLIENT_B: [u8; 4] = [10, 0, 0, 2];

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// GET /employees/:id (short: 1 per second)
// =============================================================================

#[tokio::test]
async fn test_find_one_second_request_within_window_is_rejected() {
    let h = Harness::new();
    h.seed().await;

    let (status, headers, _) = h.get("/employees/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header(&headers, "x-ratelimit-limit-short"), Some("1"));
    assert_eq!(header(&headers, "x-ratelimit-remaining-short"), Some("0"));
    assert!(headers.get("x-ratelimit-limit-long").is_none());

    h.clock.advance(Duration::from_millis(400));
    let (status, headers, body) = h.get("/employees/1").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Too Many Requests", "code": 429 }));
    assert_eq!(header(&headers, "retry-after"), Some("1"));
}

#[tokio::test]
async fn test_find_one_allowed_again_after_window() {
    let h = Harness::new();
    h.seed().await;

    assert_eq!(h.get("/employees/1").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees/1").await.0, StatusCode::TOO_MANY_REQUESTS);

    h.clock.advance(Duration::from_millis(1000));
    let (status, _, body) = h.get("/employees/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(1));
}

#[tokio::test]
async fn test_find_one_bucket_is_shared_across_ids() {
    let h = Harness::new();

    assert_eq!(h.get("/employees/1").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees/2").await.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_clients_have_independent_buckets() {
    let h = Harness::new();

    assert_eq!(h.get("/employees/1").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees/1").await.0, StatusCode::TOO_MANY_REQUESTS);

    let (status, _, _) = h
        .call(Method::GET, "/employees/1", None, CLIENT_B, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// GET /employees (long: 100 per minute)
// =============================================================================

#[tokio::test]
async fn test_find_all_rejects_request_101_within_a_minute() {
    let h = Harness::new();

    for i in 1..=100u32 {
        let (status, headers, _) = h.get("/employees").await;
        assert_eq!(status, StatusCode::OK, "request {}", i);
        assert_eq!(header(&headers, "x-ratelimit-limit-long"), Some("100"));
        let remaining = (100 - i).to_string();
        assert_eq!(
            header(&headers, "x-ratelimit-remaining-long"),
            Some(remaining.as_str())
        );
        assert!(headers.get("x-ratelimit-limit-short").is_none());
    }

    h.clock.advance(Duration::from_secs(30));
    let (status, headers, body) = h.get("/employees").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], json!(429));
    assert_eq!(header(&headers, "retry-after"), Some("30"));

    h.clock.advance(Duration::from_secs(30));
    assert_eq!(h.get("/employees").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_list_and_lookup_do_not_share_counters() {
    let h = Harness::new();

    assert_eq!(h.get("/employees/1").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees/1").await.0, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(h.get("/employees").await.0, StatusCode::OK);
}

// =============================================================================
// Exempt routes
// =============================================================================

#[tokio::test]
async fn test_exempt_routes_are_never_throttled() {
    let h = Harness::new();

    for i in 0..20 {
        let (status, headers, _) = h
            .call(
                Method::POST,
                "/employees",
                Some(json!({
                    "name": format!("E{}", i),
                    "email": format!("e{}@example.com", i),
                    "role": "INTERN"
                })),
                CLIENT_A,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(headers.get("x-ratelimit-limit-short").is_none());
    }

    for _ in 0..20 {
        let (status, _, _) = h
            .call(
                Method::PATCH,
                "/employees/1",
                Some(json!({ "name": "Renamed" })),
                CLIENT_A,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    for _ in 0..20 {
        assert_eq!(h.get("/health").await.0, StatusCode::OK);
    }

    for id in 1..=20 {
        let (status, _, body) = h
            .call(Method::DELETE, &format!("/employees/{}", id), None, CLIENT_A, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let h = Harness::new();

    let (status, _, _) = h.get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_forwarded_for_identifies_clients_when_trusted() {
    let h = Harness::with_config(RateLimitConfig {
        trust_forwarded_for: true,
        ..RateLimitConfig::default()
    });

    let first = h
        .call(Method::GET, "/employees/1", None, CLIENT_A, Some("203.0.113.5"))
        .await;
    let second = h
        .call(Method::GET, "/employees/1", None, CLIENT_A, Some("203.0.113.6"))
        .await;
    let repeat = h
        .call(
            Method::GET,
            "/employees/1",
            None,
            CLIENT_B,
            Some("203.0.113.5, 10.0.0.9"),
        )
        .await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(repeat.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_ignored_by_default() {
    let h = Harness::new();

    let first = h
        .call(Method::GET, "/employees/1", None, CLIENT_A, Some("203.0.113.5"))
        .await;
    let second = h
        .call(Method::GET, "/employees/1", None, CLIENT_A, Some("203.0.113.6"))
        .await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_configured_long_tier_limit_applies_to_listing() {
    let mut config = RateLimitConfig::default();
    for tier in &mut config.tiers {
        if tier.name == "long" {
            tier.limit = 2;
        }
    }
    let h = Harness::with_config(config);

    assert_eq!(h.get("/employees").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees").await.0, StatusCode::OK);
    assert_eq!(h.get("/employees").await.0, StatusCode::TOO_MANY_REQUESTS);
}
