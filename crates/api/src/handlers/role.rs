//! Handlers for the `/roles` resource (admin only).
//!
//! Roles are an explicit registry: they exist only when created here, and a
//! role still assigned to employees cannot be deleted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herdbook_core::error::CoreError;
use herdbook_core::listing::ROLE_LISTING;
use herdbook_core::paging;
use herdbook_core::roles::is_known_module;
use validator::Validate;

use herdbook_db::models::role::{CreateRole, PermissionInput, Role, RoleWithPermissions, UpdateRole};
use herdbook_db::repositories::{EmployeeRepo, RoleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

/// POST /api/v1/roles
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<MessageResponse<RoleWithPermissions>>)> {
    input.validate()?;
    validate_modules(&input.permissions)?;

    if RoleRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Role {} already exists",
            input.name
        ))));
    }

    let role = RoleRepo::create_with_permissions(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Successfully added the role", role)),
    ))
}

/// GET /api/v1/roles
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<Role>>>> {
    let req = params.into_request()?;
    let plan = ROLE_LISTING.plan(&req)?;

    let (items, total) =
        RoleRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// GET /api/v1/roles/{name}
pub async fn get_by_name(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse<RoleWithPermissions>>> {
    let role = RoleRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Role", &name)))?;
    let permissions = RoleRepo::permissions(&state.pool, role.id).await?;
    Ok(Json(MessageResponse::new(
        "showing the role",
        RoleWithPermissions { role, permissions },
    )))
}

/// PUT /api/v1/roles/{name}
///
/// Replaces the role's permission set wholesale.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(name): Path<String>,
    Json(input): Json<UpdateRole>,
) -> AppResult<Json<MessageResponse<RoleWithPermissions>>> {
    input.validate()?;
    validate_modules(&input.permissions)?;

    let role = RoleRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Role", &name)))?;

    let updated = RoleRepo::update_with_permissions(
        &state.pool,
        role.id,
        input.description.as_deref(),
        &input.permissions,
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::not_found("Role", &name)))?;

    Ok(Json(MessageResponse::new(
        "Successfully updated the role",
        updated,
    )))
}

/// DELETE /api/v1/roles/{name}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    let role = RoleRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Role", &name)))?;

    let assigned = EmployeeRepo::count_by_role(&state.pool, role.id).await?;
    if assigned > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Role {name} is still assigned to {assigned} employee(s)"
        ))));
    }

    let deleted = RoleRepo::delete_by_name(&state.pool, &name).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Role", &name)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the role",
        serde_json::json!({ "name": name }),
    )))
}

/// Every permission row must name a known module.
fn validate_modules(permissions: &[PermissionInput]) -> Result<(), CoreError> {
    for p in permissions {
        if !is_known_module(&p.module) {
            return Err(CoreError::Validation(format!(
                "Please enter a valid module value: {}",
                p.module
            )));
        }
    }
    Ok(())
}
