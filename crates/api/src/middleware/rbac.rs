//! Role-based access control: the admin extractor and per-module
//! permission checks against the role registry.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use herdbook_core::error::CoreError;
use herdbook_core::roles::ROLE_ADMIN;
use herdbook_db::repositories::RoleRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Require view access to a module for the authenticated employee's role.
///
/// Admins bypass the permission table; every other role needs a permission
/// row with `can_view` set.
pub async fn ensure_can_view(
    state: &AppState,
    user: &AuthUser,
    module: &str,
) -> Result<(), AppError> {
    if user.role == ROLE_ADMIN {
        return Ok(());
    }
    let permission = RoleRepo::permission(&state.pool, &user.role, module).await?;
    match permission {
        Some(p) if p.can_view => Ok(()),
        _ => Err(AppError::Core(CoreError::Forbidden(format!(
            "You do not have access to the {module} module"
        )))),
    }
}

/// Require edit access to a module for the authenticated employee's role.
pub async fn ensure_can_edit(
    state: &AppState,
    user: &AuthUser,
    module: &str,
) -> Result<(), AppError> {
    if user.role == ROLE_ADMIN {
        return Ok(());
    }
    let permission = RoleRepo::permission(&state.pool, &user.role, module).await?;
    match permission {
        Some(p) if p.can_edit => Ok(()),
        _ => Err(AppError::Core(CoreError::Forbidden(format!(
            "You do not have edit access to the {module} module"
        )))),
    }
}
