//! # Employee Service
//!
//! CRUD operations over the employee repository. Business-rule failures
//! (duplicate email, unknown id) come back as envelopes with
//! `success: false`; only store faults surface as `Err`.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{StoreError, StoreResult};
use super::model::{CreateEmployeeRequest, Employee, EmployeeFilter, Role, UpdateEmployeeRequest};
use super::repository::EmployeeRepository;

pub const MSG_EMAIL_EXISTS: &str = "Email already exists";
pub const MSG_CREATED: &str = "Employee created successfully";
pub const MSG_NOT_FOUND: &str = "Employee not found";
pub const MSG_UPDATED: &str = "Employee updated successfully";
pub const MSG_UPDATE_FAILED: &str = "Employee not found or update failed";
pub const MSG_DELETED: &str = "Employee deleted successfully";
pub const MSG_DELETE_FAILED: &str = "Employee not found or deletion failed";

/// `{ message, data, success }` response wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    pub data: Option<T>,
    pub success: bool,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data: Some(data),
            success: true,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            message: message.to_string(),
            data: None,
            success: false,
        }
    }
}

/// `{ message, success }` response for deletions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    pub message: String,
    pub success: bool,
}

impl Acknowledgement {
    fn new(message: &str, success: bool) -> Self {
        Self {
            message: message.to_string(),
            success,
        }
    }
}

/// Result of a lookup by id: the bare record, or a not-found envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lookup {
    Found(Employee),
    Missing(Envelope<Employee>),
}

/// Employee record service
#[derive(Clone)]
pub struct EmployeeService {
    repository: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(repository: Arc<dyn EmployeeRepository>) -> Self {
        Self { repository }
    }

    /// Create an employee unless the email is already taken
    pub fn create(&self, request: CreateEmployeeRequest) -> StoreResult<Envelope<Employee>> {
        if self.repository.find_by_email(&request.email)?.is_some() {
            tracing::debug!(email = %request.email, "create rejected, email exists");
            return Ok(Envelope::failed(MSG_EMAIL_EXISTS));
        }

        match self.repository.create(&request) {
            Ok(employee) => {
                tracing::info!(employee_id = employee.id, role = %employee.role, "employee created");
                Ok(Envelope::ok(MSG_CREATED, employee))
            }
            // A concurrent create won the race; the store's unique check caught it
            Err(StoreError::EmailConflict(email)) => {
                tracing::debug!(%email, "create rejected by store, email exists");
                Ok(Envelope::failed(MSG_EMAIL_EXISTS))
            }
            Err(e) => Err(e),
        }
    }

    /// List every employee, optionally restricted to one role
    pub fn find_all(&self, role: Option<Role>) -> StoreResult<Vec<Employee>> {
        self.repository.find_many(EmployeeFilter { role })
    }

    /// Look up a single employee
    pub fn find_one(&self, id: i64) -> StoreResult<Lookup> {
        Ok(match self.repository.find_by_id(id)? {
            Some(employee) => Lookup::Found(employee),
            None => Lookup::Missing(Envelope::failed(MSG_NOT_FOUND)),
        })
    }

    /// Apply a partial update. Any store failure becomes a failure envelope.
    pub fn update(&self, id: i64, changes: UpdateEmployeeRequest) -> Envelope<Employee> {
        match self.repository.update(id, &changes) {
            Ok(employee) => {
                tracing::info!(employee_id = id, "employee updated");
                Envelope::ok(MSG_UPDATED, employee)
            }
            Err(e) => {
                tracing::debug!(employee_id = id, error = %e, "update failed");
                Envelope::failed(MSG_UPDATE_FAILED)
            }
        }
    }

    /// Delete an employee. Any store failure becomes a failure acknowledgement.
    pub fn remove(&self, id: i64) -> Acknowledgement {
        match self.repository.delete(id) {
            Ok(_) => {
                tracing::info!(employee_id = id, "employee deleted");
                Acknowledgement::new(MSG_DELETED, true)
            }
            Err(e) => {
                tracing::debug!(employee_id = id, error = %e, "delete failed");
                Acknowledgement::new(MSG_DELETE_FAILED, false)
            }
        }
    }
}
