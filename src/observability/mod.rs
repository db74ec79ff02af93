//! Observability for the employee service
//!
//! Structured logging through `tracing`:
//! - subscriber setup (text or JSON, `RUST_LOG` aware)
//! - typed lifecycle events
//!
//! # Usage
//!
//! ```ignore
//! use employee_service::observability::{init_tracing, log_event, Event, LogConfig};
//!
//! init_tracing(&LogConfig::default())?;
//! log_event(Event::BootStart, &[("config", "./employees.json")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{init_tracing, LogConfig, LogFormat};

use thiserror::Error;

/// Observability error. Never fatal to request handling.
#[derive(Debug, Error)]
#[error("observability failure: {message}")]
pub struct ObservabilityError {
    message: String,
}

impl ObservabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

/// Log a lifecycle event with fields
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let details = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ");

    if event.is_fatal() {
        tracing::error!(event = event.as_str(), %details, "lifecycle");
    } else {
        tracing::info!(event = event.as_str(), %details, "lifecycle");
    }
}
