//! employee-service - Employee records over HTTP with per-route rate limiting
//!
//! - `employees`: model, validation, storage and CRUD service
//! - `rate_limit`: fixed-window tiers and route policies
//! - `http_server`: axum router, handlers and throttle middleware
//! - `observability`: tracing setup and lifecycle events
//! - `cli`: command-line entry points

pub mod cli;
pub mod employees;
pub mod http_server;
pub mod observability;
pub mod rate_limit;
