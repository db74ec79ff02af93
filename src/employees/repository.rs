//! # Employee Repository
//!
//! Storage abstraction for employee records and its in-memory implementation.
//! Uniqueness of `email` and existence of `id` are enforced here, inside the
//! write lock, so the store is the final backstop for concurrent writers.

use std::sync::RwLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::model::{CreateEmployeeRequest, Employee, EmployeeFilter, UpdateEmployeeRequest};

/// Employee repository trait
///
/// Abstracts storage operations for employees.
pub trait EmployeeRepository: Send + Sync {
    /// Find an employee by id
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>>;

    /// Find an employee by email
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;

    /// List employees matching the filter, in id order
    fn find_many(&self, filter: EmployeeFilter) -> StoreResult<Vec<Employee>>;

    /// Insert a new employee and return the stored record
    fn create(&self, data: &CreateEmployeeRequest) -> StoreResult<Employee>;

    /// Apply a partial update and return the updated record
    fn update(&self, id: i64, changes: &UpdateEmployeeRequest) -> StoreResult<Employee>;

    /// Delete an employee and return the removed record
    fn delete(&self, id: i64) -> StoreResult<Employee>;
}

/// Employee rows plus the autoincrement counter.
///
/// Shared by the in-memory and file-backed repositories; the file repository
/// serializes it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EmployeeTable {
    next_id: i64,
    rows: Vec<Employee>,
}

impl Default for EmployeeTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl EmployeeTable {
    pub(crate) fn get(&self, id: i64) -> Option<&Employee> {
        self.rows.iter().find(|e| e.id == id)
    }

    pub(crate) fn get_by_email(&self, email: &str) -> Option<&Employee> {
        self.rows.iter().find(|e| e.email == email)
    }

    pub(crate) fn select(&self, filter: EmployeeFilter) -> Vec<Employee> {
        self.rows
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    pub(crate) fn insert(&mut self, data: &CreateEmployeeRequest) -> StoreResult<Employee> {
        if self.get_by_email(&data.email).is_some() {
            return Err(StoreError::EmailConflict(data.email.clone()));
        }

        let now = Utc::now();
        let employee = Employee {
            id: self.next_id,
            name: data.name.clone(),
            email: data.email.clone(),
            role: data.role,
            created_at: now,
            updated_at: now,
        };

        self.next_id += 1;
        self.rows.push(employee.clone());
        Ok(employee)
    }

    pub(crate) fn apply(&mut self, id: i64, changes: &UpdateEmployeeRequest) -> StoreResult<Employee> {
        if let Some(email) = &changes.email {
            if self.rows.iter().any(|e| e.id != id && &e.email == email) {
                return Err(StoreError::EmailConflict(email.clone()));
            }
        }

        let employee = self
            .rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(name) = &changes.name {
            employee.name = name.clone();
        }
        if let Some(email) = &changes.email {
            employee.email = email.clone();
        }
        if let Some(role) = changes.role {
            employee.role = role;
        }
        employee.updated_at = Utc::now();

        Ok(employee.clone())
    }

    pub(crate) fn remove(&mut self, id: i64) -> StoreResult<Employee> {
        let position = self
            .rows
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.rows.remove(position))
    }
}

/// In-memory employee repository
#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    table: RwLock<EmployeeTable>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.get_by_email(email).cloned())
    }

    fn find_many(&self, filter: EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.select(filter))
    }

    fn create(&self, data: &CreateEmployeeRequest) -> StoreResult<Employee> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        table.insert(data)
    }

    fn update(&self, id: i64, changes: &UpdateEmployeeRequest) -> StoreResult<Employee> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        table.apply(id, changes)
    }

    fn delete(&self, id: i64) -> StoreResult<Employee> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        table.remove(id)
    }
}
