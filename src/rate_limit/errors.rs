//! Rate limiter errors.

use thiserror::Error;

/// Result type for limiter operations
pub type RateLimitResult<T> = Result<T, RateLimitError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// The bucket map lock was poisoned by a panicking request
    #[error("Rate limiter state poisoned")]
    Poisoned,

    /// Tier configuration rejected at startup
    #[error("Invalid rate limit config: {0}")]
    InvalidConfig(String),
}
