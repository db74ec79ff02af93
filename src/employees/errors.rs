//! # Employee Errors
//!
//! Store and validation errors for the employee module.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by an employee repository
#[derive(Debug, Error)]
pub enum StoreError {
    /// No employee with this id
    #[error("Employee {0} not found")]
    NotFound(i64),

    /// Unique constraint on email violated
    #[error("Email already exists: {0}")]
    EmailConflict(String),

    /// A lock guarding the table was poisoned
    #[error("Store lock poisoned")]
    Poisoned,

    /// Reading or writing the backing file failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file content could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Request body rejected before reaching the service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violation: impl Into<String>) -> Self {
        Self {
            violations: vec![violation.into()],
        }
    }

    pub fn from_violations(violations: Vec<String>) -> Self {
        Self { violations }
    }
}
