//! Employee HTTP Routes
//!
//! CRUD endpoints under `/employees` and their rate limit policies.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::errors::{ApiError, ApiResult};
use crate::employees::{validation, Acknowledgement, Employee, EmployeeService, Envelope, Lookup};
use crate::rate_limit::{PolicyTable, RoutePolicy, LONG, SHORT};

pub const EMPLOYEES_PATH: &str = "/employees";
pub const EMPLOYEE_PATH: &str = "/employees/:id";

// ==================
// Shared State
// ==================

/// Employee state shared across handlers
pub struct EmployeesState {
    pub service: EmployeeService,
}

impl EmployeesState {
    pub fn new(service: EmployeeService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub role: Option<String>,
}

// ==================
// Routes
// ==================

/// Create employee routes
pub fn employee_routes(state: Arc<EmployeesState>) -> Router {
    Router::new()
        .route(EMPLOYEES_PATH, get(find_all_handler).post(create_handler))
        .route(
            EMPLOYEE_PATH,
            get(find_one_handler)
                .patch(update_handler)
                .delete(remove_handler),
        )
        .with_state(state)
}

/// Rate limit policies for the employee routes.
///
/// The group is exempt by default; listing counts against `long` only, and
/// lookup by id counts against `short` with a limit of one per second.
pub fn employee_route_policies() -> PolicyTable {
    PolicyTable::new()
        .route(
            Method::POST,
            EMPLOYEES_PATH,
            RoutePolicy::exempt("employees.create"),
        )
        .route(
            Method::GET,
            EMPLOYEES_PATH,
            RoutePolicy::exempt("employees.findAll").enforce(LONG),
        )
        .route(
            Method::GET,
            EMPLOYEE_PATH,
            RoutePolicy::exempt("employees.findOne").throttle(SHORT, 1, Duration::from_millis(1000)),
        )
        .route(
            Method::PATCH,
            EMPLOYEE_PATH,
            RoutePolicy::exempt("employees.update"),
        )
        .route(
            Method::DELETE,
            EMPLOYEE_PATH,
            RoutePolicy::exempt("employees.remove"),
        )
}

// ==================
// Helper Functions
// ==================

fn employee_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::InvalidParam(format!("id must be an integer ({})", e.body_text())))
}

// ==================
// Handlers
// ==================

async fn create_handler(
    State(state): State<Arc<EmployeesState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Envelope<Employee>>)> {
    let request = validation::parse_create(&body)?;
    let envelope = state.service.create(request)?;

    let status = if envelope.success {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(envelope)))
}

async fn find_all_handler(
    State(state): State<Arc<EmployeesState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Employee>>> {
    let Query(query) = query.map_err(|e| ApiError::InvalidParam(e.body_text()))?;

    let role = match query.role.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(validation::parse_role(raw)?),
    };

    Ok(Json(state.service.find_all(role)?))
}

async fn find_one_handler(
    State(state): State<Arc<EmployeesState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Lookup>> {
    let id = employee_id(path)?;
    Ok(Json(state.service.find_one(id)?))
}

async fn update_handler(
    State(state): State<Arc<EmployeesState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<Json<Envelope<Employee>>> {
    let id = employee_id(path)?;
    let changes = validation::parse_update(&body)?;
    Ok(Json(state.service.update(id, changes)))
}

async fn remove_handler(
    State(state): State<Arc<EmployeesState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Acknowledgement>> {
    let id = employee_id(path)?;
    Ok(Json(state.service.remove(id)))
}
