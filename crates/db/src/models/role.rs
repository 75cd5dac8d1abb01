//! Role registry model and DTOs.

use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A role row from the registry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A per-module permission row for one role.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RolePermission {
    pub id: DbId,
    pub role_id: DbId,
    pub module: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role with its full permission set, as returned by the role endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<RolePermission>,
}

/// One permission entry in a create/update payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionInput {
    #[validate(length(min = 1, max = 50))]
    pub module: String,
    pub can_view: bool,
    pub can_edit: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(nested)]
    pub permissions: Vec<PermissionInput>,
}

/// DTO for editing a role: replaces the permission set wholesale.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(nested)]
    pub permissions: Vec<PermissionInput>,
}
