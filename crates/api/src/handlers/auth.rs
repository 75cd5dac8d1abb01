//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::types::DbId;
use serde::{Deserialize, Serialize};

use herdbook_db::repositories::{EmployeeRepo, RoleRepo, SessionRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub employee: EmployeeInfo,
}

/// Public employee info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct EmployeeInfo {
    pub id: DbId,
    pub employee_code: String,
    pub name: String,
    pub username: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Find employee by username.
    let employee = EmployeeRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    // 2. Check if the account is active.
    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Check if the account is temporarily locked.
    if let Some(locked_until) = employee.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 4. Verify password.
    let password_valid = verify_password(&input.password, &employee.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock if threshold exceeded.
        EmployeeRepo::increment_failed_login(&state.pool, employee.id).await?;

        let new_count = employee.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            EmployeeRepo::lock_account(&state.pool, employee.id, lock_until).await?;
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    EmployeeRepo::record_successful_login(&state.pool, employee.id).await?;

    // 7. Resolve role name for JWT claims.
    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;

    // 8. Issue tokens and persist the refresh-token session.
    issue_tokens(&state, employee.id, &role_name, |emp_id| EmployeeInfo {
        id: emp_id,
        employee_code: employee.employee_code.clone(),
        name: employee.name.clone(),
        username: employee.username.clone(),
        role: role_name.clone(),
    })
    .await
}

/// POST /api/v1/auth/refresh
///
/// Rotate a refresh token: the presented session is revoked and a new
/// session plus access token are issued.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_active_by_hash(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let employee = EmployeeRepo::find_by_id(&state.pool, session.employee_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // Rotation: the old session can never be replayed.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    issue_tokens(&state, employee.id, &role_name, |emp_id| EmployeeInfo {
        id: emp_id,
        employee_code: employee.employee_code.clone(),
        name: employee.name.clone(),
        username: employee.username.clone(),
        role: role_name.clone(),
    })
    .await
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented refresh-token session. Requires authentication.
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let hash = hash_refresh_token(&input.refresh_token);
    if let Some(session) = SessionRepo::find_active_by_hash(&state.pool, &hash).await? {
        SessionRepo::revoke(&state.pool, session.id).await?;
    }
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

/// Generate an access/refresh token pair and persist the refresh session.
async fn issue_tokens(
    state: &AppState,
    employee_id: DbId,
    role_name: &str,
    build_info: impl FnOnce(DbId) -> EmployeeInfo,
) -> AppResult<Json<AuthResponse>> {
    let access_token = generate_access_token(employee_id, role_name, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);
    SessionRepo::create(&state.pool, employee_id, &refresh_hash, expires_at).await?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        employee: build_info(employee_id),
    }))
}
