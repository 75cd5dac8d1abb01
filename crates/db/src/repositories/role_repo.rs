//! Repository for the `roles` and `role_permissions` tables.
//!
//! The registry is explicit: roles are created through the role endpoints
//! only, and referencing a missing role is an error, never an implicit
//! create.

use herdbook_core::listing::{Effective, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, PermissionInput, Role, RolePermission, RoleWithPermissions};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

const PERM_COLUMNS: &str =
    "id, role_id, module, can_view, can_edit, created_at, updated_at";

/// Provides registry operations for roles and their permission rows.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a role with its permission rows, as one transaction.
    pub async fn create_with_permissions(
        pool: &PgPool,
        input: &CreateRole,
    ) -> Result<RoleWithPermissions, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        let permissions =
            insert_permissions(&mut tx, role.id, &input.permissions).await?;

        tx.commit().await?;
        Ok(RoleWithPermissions { role, permissions })
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a role ID to its name, returning `"unknown"` if the ID is
    /// missing.
    pub async fn resolve_name(pool: &PgPool, role_id: DbId) -> Result<String, sqlx::Error> {
        Ok(Self::find_by_id(pool, role_id)
            .await?
            .map(|r| r.name)
            .unwrap_or_else(|| "unknown".to_string()))
    }

    /// The permission rows for one role, ordered by module name.
    pub async fn permissions(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<RolePermission>, sqlx::Error> {
        let query = format!(
            "SELECT {PERM_COLUMNS} FROM role_permissions WHERE role_id = $1 ORDER BY module"
        );
        sqlx::query_as::<_, RolePermission>(&query)
            .bind(role_id)
            .fetch_all(pool)
            .await
    }

    /// Look up one role/module permission row by names.
    pub async fn permission(
        pool: &PgPool,
        role_name: &str,
        module: &str,
    ) -> Result<Option<RolePermission>, sqlx::Error> {
        let query = format!(
            "SELECT p.id, p.role_id, p.module, p.can_view, p.can_edit, p.created_at, p.updated_at \
             FROM role_permissions p JOIN roles r ON r.id = p.role_id \
             WHERE r.name = $1 AND p.module = $2"
        );
        sqlx::query_as::<_, RolePermission>(&query)
            .bind(role_name)
            .bind(module)
            .fetch_optional(pool)
            .await
    }

    /// Replace a role's description and permission set, as one transaction.
    pub async fn update_with_permissions(
        pool: &PgPool,
        role_id: DbId,
        description: Option<&str>,
        permissions: &[PermissionInput],
    ) -> Result<Option<RoleWithPermissions>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE roles SET description = COALESCE($2, description) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Role>(&query)
            .bind(role_id)
            .bind(description)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(role) = updated else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        let permissions = insert_permissions(&mut tx, role_id, permissions).await?;

        tx.commit().await?;
        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    /// Delete a role by name. Permission rows cascade. Returns `true` if a
    /// row was removed.
    pub async fn delete_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the role listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<Role>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM roles {} ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, Role>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM roles {}", wb.where_sql());
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }
}

async fn insert_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_id: DbId,
    inputs: &[PermissionInput],
) -> Result<Vec<RolePermission>, sqlx::Error> {
    let mut rows = Vec::with_capacity(inputs.len());
    for p in inputs {
        let query = format!(
            "INSERT INTO role_permissions (role_id, module, can_view, can_edit) \
             VALUES ($1, $2, $3, $4) RETURNING {PERM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RolePermission>(&query)
            .bind(role_id)
            .bind(&p.module)
            .bind(p.can_view)
            .bind(p.can_edit)
            .fetch_one(&mut **tx)
            .await?;
        rows.push(row);
    }
    Ok(rows)
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "created_at DESC",
        SortKey::Oldest => "created_at ASC",
        SortKey::NameAsc => "name ASC",
        SortKey::NameDesc => "name DESC",
    }
}

fn build_where(eff: &Effective) -> WhereBuilder {
    let mut wb = WhereBuilder::new();
    if let Some(term) = &eff.search {
        wb.clause("name ILIKE '%' || $? || '%'", BindValue::Text(term.clone()));
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("created_at::date", from, to);
    }
    wb
}
