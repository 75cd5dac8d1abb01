//! Employee entity model and DTOs.

use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An employee row. Employees are also the authentication principals.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    /// Generated identity, e.g. `"EMP003"`.
    pub employee_code: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: DbId,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an employee. Code, username, and the initial password
/// are generated, not supplied.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Role name; must already exist in the role registry.
    #[validate(length(min = 1, max = 50))]
    pub role: String,
    #[validate(length(max = 20))]
    pub mobile: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// Column-level changes after the handler has resolved the role name to an
/// id and regenerated the username for a rename.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub role_id: Option<DbId>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for editing an employee. All fields are optional; a name change
/// regenerates the username's name part but keeps its numeric suffix.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub role: Option<String>,
    #[validate(length(max = 20))]
    pub mobile: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub is_active: Option<bool>,
}
