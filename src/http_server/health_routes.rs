//! Health HTTP Route
//!
//! Liveness endpoint for load balancers and orchestrators.

use axum::{http::Method, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::rate_limit::{PolicyTable, RoutePolicy};

pub const HEALTH_PATH: &str = "/health";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route(HEALTH_PATH, get(health_handler))
}

/// Probes are never throttled
pub fn health_route_policies() -> PolicyTable {
    PolicyTable::new().route(Method::GET, HEALTH_PATH, RoutePolicy::exempt("health"))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}
