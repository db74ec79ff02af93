//! # Employees
//!
//! Employee records: model, strict payload validation, storage and the
//! CRUD service used by the HTTP layer.

pub mod errors;
pub mod file_repository;
pub mod model;
pub mod repository;
pub mod service;
pub mod validation;

pub use errors::{StoreError, StoreResult, ValidationError};
pub use file_repository::JsonFileEmployeeRepository;
pub use model::{CreateEmployeeRequest, Employee, EmployeeFilter, Role, UpdateEmployeeRequest};
pub use repository::{EmployeeRepository, InMemoryEmployeeRepository};
pub use service::{Acknowledgement, EmployeeService, Envelope, Lookup};
