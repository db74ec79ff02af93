//! # Employee Model
//!
//! The employee record, its role enumeration and the request payloads that
//! create or patch it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Employee role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Intern,
    Engineer,
    Admin,
}

impl Role {
    /// Returns the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Intern => "INTERN",
            Role::Engineer => "ENGINEER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTERN" => Ok(Role::Intern),
            "ENGINEER" => Ok(Role::Engineer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!(
                "role must be one of INTERN, ENGINEER, ADMIN (got '{}')",
                other
            )),
        }
    }
}

/// Employee record as stored and returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Store-generated identifier, never reused
    pub id: i64,

    pub name: String,

    /// Unique across all employees
    pub email: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Create payload. Every field is required and nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Patch payload. Any subset of the create fields; `id` is not accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<Role>,
}

impl UpdateEmployeeRequest {
    /// True when the patch carries no field
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Filter for listing employees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub role: Option<Role>,
}

impl EmployeeFilter {
    pub fn by_role(role: Role) -> Self {
        Self { role: Some(role) }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        self.role.map_or(true, |role| employee.role == role)
    }
}
