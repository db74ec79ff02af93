//! # HTTP Server
//!
//! Main HTTP server combining the employee and health routers behind the
//! rate limit middleware, request tracing and CORS.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::employee_routes::{employee_route_policies, employee_routes, EmployeesState};
use super::health_routes::{health_route_policies, health_routes};
use super::throttle::{enforce_rate_limit, RateLimitGuard};
use crate::employees::EmployeeService;
use crate::rate_limit::{Clock, RateLimitConfig, RateLimiter, SystemClock};

/// HTTP server for the employee API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
    limiter: Arc<RateLimiter>,
    purge_interval: Duration,
}

impl HttpServer {
    /// Create a server using the system clock
    pub fn new(
        config: HttpServerConfig,
        service: EmployeeService,
        rate_limit: &RateLimitConfig,
    ) -> Self {
        Self::with_clock(config, service, rate_limit, Arc::new(SystemClock::new()))
    }

    /// Create a server with an explicit clock for the rate limiter
    pub fn with_clock(
        config: HttpServerConfig,
        service: EmployeeService,
        rate_limit: &RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::with_clock(rate_limit.tiers.clone(), clock));
        let guard = RateLimitGuard::new(
            Arc::clone(&limiter),
            health_route_policies().merge(employee_route_policies()),
            rate_limit.trust_forwarded_for,
        );
        let router = Self::build_router(&config, service, guard);

        Self {
            config,
            router,
            limiter,
            purge_interval: rate_limit.purge_interval(),
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, service: EmployeeService, guard: RateLimitGuard) -> Router {
        let employees_state = Arc::new(EmployeesState::new(service));

        // Configure CORS from config
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(employee_routes(employees_state))
            // Only matched routes are throttled; unknown paths fall through to 404
            .route_layer(middleware::from_fn_with_state(guard, enforce_rate_limit))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl+C or SIGTERM
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let purge = tokio::spawn(purge_buckets(Arc::clone(&self.limiter), self.purge_interval));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "employee API listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        purge.abort();
        tracing::info!("server shutdown complete");
        Ok(())
    }
}

/// Periodically drop rate limit buckets whose window has closed
async fn purge_buckets(limiter: Arc<RateLimiter>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match limiter.purge_expired() {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "purged expired rate limit buckets"),
            Err(e) => tracing::error!(error = %e, "rate limit purge failed"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
