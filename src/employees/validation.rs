//! # Request Validation
//!
//! Strict whitelist validation for employee payloads. Runs before the
//! service is invoked and never mutates anything.
//!
//! - Unknown properties are rejected
//! - Missing required properties are rejected (create only)
//! - `name` must be a non-empty string
//! - `email` must look like an email address
//! - `role` must be one of INTERN, ENGINEER, ADMIN
//!
//! Every violation in a body is reported, not just the first one.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::errors::ValidationError;
use super::model::{CreateEmployeeRequest, Role, UpdateEmployeeRequest};

const FIELDS: [&str; 3] = ["name", "email", "role"];

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    })
}

/// Parse and validate a create body
pub fn parse_create(body: &[u8]) -> Result<CreateEmployeeRequest, ValidationError> {
    let object = parse_object(body)?;
    let mut violations = unknown_properties(&object);

    for field in FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => violations.push(format!("{} is required", field)),
            Some(value) => check_field(field, value, &mut violations),
        }
    }

    finish(object, violations)
}

/// Parse and validate a partial update body. An empty body is an empty patch;
/// `null` is rejected since every column is required.
pub fn parse_update(body: &[u8]) -> Result<UpdateEmployeeRequest, ValidationError> {
    let object = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        parse_object(body)?
    };
    let mut violations = unknown_properties(&object);

    for field in FIELDS {
        match object.get(field) {
            None => {}
            Some(Value::Null) => violations.push(format!("{} should not be null", field)),
            Some(value) => check_field(field, value, &mut violations),
        }
    }

    finish(object, violations)
}

/// Parse the `role` query parameter
pub fn parse_role(raw: &str) -> Result<Role, ValidationError> {
    raw.parse::<Role>().map_err(ValidationError::new)
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::new(format!("body must be valid JSON: {}", e)))?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ValidationError::new("body must be a JSON object")),
    }
}

fn unknown_properties(object: &Map<String, Value>) -> Vec<String> {
    object
        .keys()
        .filter(|key| !FIELDS.contains(&key.as_str()))
        .map(|key| format!("property {} should not exist", key))
        .collect()
}

fn check_field(field: &str, value: &Value, violations: &mut Vec<String>) {
    let Some(text) = value.as_str() else {
        violations.push(format!("{} must be a string", field));
        return;
    };

    match field {
        "name" if text.trim().is_empty() => {
            violations.push("name should not be empty".to_string());
        }
        "email" if !email_pattern().is_match(text) => {
            violations.push("email must be an email".to_string());
        }
        "role" => {
            if let Err(message) = text.parse::<Role>() {
                violations.push(message);
            }
        }
        _ => {}
    }
}

fn finish<T>(object: Map<String, Value>, violations: Vec<String>) -> Result<T, ValidationError>
where
    T: serde::de::DeserializeOwned,
{
    if !violations.is_empty() {
        return Err(ValidationError::from_violations(violations));
    }

    serde_json::from_value(Value::Object(object)).map_err(|e| ValidationError::new(e.to_string()))
}
