//! # HTTP Server Module
//!
//! Axum server exposing the employee API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/employees` - Create and list employees
//! - `/employees/:id` - Read, update and delete one employee

pub mod config;
pub mod employee_routes;
pub mod errors;
pub mod health_routes;
pub mod server;
pub mod throttle;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
pub use throttle::RateLimitGuard;
