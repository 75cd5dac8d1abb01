//! Handlers for the `/employees` resource (admin only).
//!
//! Employee identity and login credentials are generated, not supplied:
//! code `EMP{seq:03}`, username `{first name}{seq:03}`, and an initial
//! password that is returned exactly once in the create response.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herdbook_core::error::CoreError;
use herdbook_core::listing::EMPLOYEE_LISTING;
use herdbook_core::{credentials, paging};
use serde::Serialize;
use validator::Validate;

use herdbook_db::models::employee::{CreateEmployee, Employee, EmployeeChanges, UpdateEmployee};
use herdbook_db::repositories::{EmployeeRepo, RoleRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

/// Create response payload: the employee plus the one-time plaintext
/// password.
#[derive(Debug, Serialize)]
pub struct CreatedEmployee {
    #[serde(flatten)]
    pub employee: Employee,
    /// Shown to the admin once; only the Argon2id hash is stored.
    pub initial_password: String,
}

/// POST /api/v1/employees
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<MessageResponse<CreatedEmployee>>)> {
    input.validate()?;

    let role = RoleRepo::find_by_name(&state.pool, &input.role)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Role", &input.role)))?;

    let seq = EmployeeRepo::next_sequence(&state.pool).await?;
    let code = credentials::employee_code(seq);
    let username = credentials::derive_username(&input.name, seq)?;
    let password = credentials::derive_password(&input.name, seq)?;
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let employee = EmployeeRepo::create(
        &state.pool,
        &code,
        &input.name,
        &username,
        &password_hash,
        role.id,
        input.mobile.as_deref(),
        input.address.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Successfully added the employee",
            CreatedEmployee {
                employee,
                initial_password: password,
            },
        )),
    ))
}

/// GET /api/v1/employees
///
/// Filter tokens are role names, validated against the registry before the
/// query runs.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<Employee>>>> {
    let req = params.into_request()?;
    let plan = EMPLOYEE_LISTING.plan(&req)?;

    for (_, token) in &plan.filters {
        if RoleRepo::find_by_name(&state.pool, token).await?.is_none() {
            return Err(AppError::Core(CoreError::Validation(
                "Please enter a valid filter value".to_string(),
            )));
        }
    }

    let (items, total) =
        EmployeeRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// GET /api/v1/employees/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(code): Path<String>,
) -> AppResult<Json<MessageResponse<Employee>>> {
    let employee = EmployeeRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Employee", &code)))?;
    Ok(Json(MessageResponse::new("showing the employee", employee)))
}

/// PUT /api/v1/employees/{code}
///
/// A rename regenerates the username's name part but preserves its numeric
/// suffix, so the login stays stable.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(code): Path<String>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<Json<MessageResponse<Employee>>> {
    input.validate()?;

    let existing = EmployeeRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Employee", &code)))?;

    let role_id = match &input.role {
        Some(role_name) => Some(
            RoleRepo::find_by_name(&state.pool, role_name)
                .await?
                .ok_or_else(|| AppError::Core(CoreError::not_found("Role", role_name)))?
                .id,
        ),
        None => None,
    };

    let username = match &input.name {
        Some(new_name) => Some(credentials::renamed_username(&existing.username, new_name)?),
        None => None,
    };

    let changes = EmployeeChanges {
        name: input.name,
        username,
        role_id,
        mobile: input.mobile,
        address: input.address,
        is_active: input.is_active,
    };

    let employee = EmployeeRepo::update_by_code(&state.pool, &code, &changes)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Employee", &code)))?;
    Ok(Json(MessageResponse::new(
        "Successfully updated the employee",
        employee,
    )))
}

/// DELETE /api/v1/employees/{code}
///
/// Deactivation, not removal: the row stays for auditability but the
/// account can no longer log in.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(code): Path<String>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    let deactivated = EmployeeRepo::deactivate_by_code(&state.pool, &code).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::not_found("Employee", &code)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deactivated the employee",
        serde_json::json!({ "employee_code": code }),
    )))
}
