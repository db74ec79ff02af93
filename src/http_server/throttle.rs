//! Rate limit middleware
//!
//! Looks up the matched route in the policy table, charges the client's
//! buckets and either forwards the request or answers 429. Every enforced
//! tier reports `X-RateLimit-{Limit,Remaining,Reset}-<tier>` headers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::errors::{ceil_secs, ApiError};
use crate::rate_limit::{PolicyTable, RateLimiter, Verdict};

const UNKNOWN_CLIENT: &str = "unknown";

/// Shared state for the rate limit middleware
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    pub limiter: Arc<RateLimiter>,
    pub policies: Arc<PolicyTable>,
    pub trust_forwarded_for: bool,
}

impl RateLimitGuard {
    pub fn new(limiter: Arc<RateLimiter>, policies: PolicyTable, trust_forwarded_for: bool) -> Self {
        Self {
            limiter,
            policies: Arc::new(policies),
            trust_forwarded_for,
        }
    }
}

/// Client identity for bucket keys.
///
/// The peer IP of the connection, or the first `X-Forwarded-For` entry when
/// the server sits behind a trusted proxy.
pub fn client_identity(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(client) = forwarded {
            return client.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware enforcing the policy table. Install with `route_layer` so the
/// matched route path is available.
pub async fn enforce_rate_limit(
    State(guard): State<RateLimitGuard>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let path = matched
        .as_ref()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let client = client_identity(&request, guard.trust_forwarded_for);
    let policy = guard.policies.policy_for(request.method(), &path);

    let verdict = match guard.limiter.check(&client, &policy) {
        Ok(verdict) => verdict,
        Err(e) => return ApiError::from(e).into_response(),
    };

    if let Some(rejected) = verdict.rejected() {
        tracing::warn!(
            client = %client,
            route = policy.key(),
            tier = %rejected.tier,
            "rate limit exceeded"
        );
        let mut response = ApiError::RateLimited {
            tier: rejected.tier.clone(),
            retry_after: rejected.decision.reset_after,
        }
        .into_response();
        apply_headers(response.headers_mut(), &verdict);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &verdict);
    response
}

fn apply_headers(headers: &mut HeaderMap, verdict: &Verdict) {
    for outcome in &verdict.outcomes {
        let d = &outcome.decision;
        let values = [
            ("limit", d.limit.to_string()),
            ("remaining", d.remaining.to_string()),
            ("reset", ceil_secs(d.reset_after).to_string()),
        ];

        for (suffix, value) in values {
            let name = HeaderName::try_from(format!("x-ratelimit-{}-{}", suffix, outcome.tier));
            let value = HeaderValue::try_from(value);
            if let (Ok(name), Ok(value)) = (name, value) {
                headers.insert(name, value);
            }
        }
    }
}
