//! Repository for the `employees` table.

use herdbook_core::listing::{Effective, FilterDomain, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::employee::{Employee, EmployeeChanges};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries, prefixed for the roles join used by
/// the listing.
const COLUMNS: &str = "\
    e.id, e.employee_code, e.name, e.username, e.password_hash, e.role_id, \
    e.mobile, e.address, e.is_active, e.last_login_at, e.failed_login_count, \
    e.locked_until, e.created_at, e.updated_at";

/// Provides CRUD, listing, and login-state operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Next free credential sequence number: one past the highest numeric
    /// part of any existing employee code.
    ///
    /// Concurrent creates may race to the same sequence; the unique
    /// constraints on code and username turn the loser into a 409.
    pub async fn next_sequence(pool: &PgPool) -> Result<u32, sqlx::Error> {
        let max: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(SUBSTRING(employee_code FROM 4) AS INTEGER)), 0) \
             FROM employees",
        )
        .fetch_one(pool)
        .await?;
        Ok(max.max(0) as u32 + 1)
    }

    /// Insert an employee with pre-generated code, username, and password
    /// hash, returning the created row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        employee_code: &str,
        name: &str,
        username: &str,
        password_hash: &str,
        role_id: DbId,
        mobile: Option<&str>,
        address: Option<&str>,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees AS e \
                (employee_code, name, username, password_hash, role_id, mobile, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(employee_code)
            .bind(name)
            .bind(username)
            .bind(password_hash)
            .bind(role_id)
            .bind(mobile)
            .bind(address)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees e WHERE e.employee_code = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees e WHERE e.username = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees e WHERE e.id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply resolved changes to an employee. Only non-`None` fields are
    /// applied. Returns `None` if no row with the given code exists.
    pub async fn update_by_code(
        pool: &PgPool,
        code: &str,
        changes: &EmployeeChanges,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees AS e SET
                name = COALESCE($2, name),
                username = COALESCE($3, username),
                role_id = COALESCE($4, role_id),
                mobile = COALESCE($5, mobile),
                address = COALESCE($6, address),
                is_active = COALESCE($7, is_active)
             WHERE e.employee_code = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(code)
            .bind(&changes.name)
            .bind(&changes.username)
            .bind(changes.role_id)
            .bind(&changes.mobile)
            .bind(&changes.address)
            .bind(changes.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate an employee (soft removal). Returns `true` if a row was
    /// marked inactive.
    pub async fn deactivate_by_code(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE employees SET is_active = FALSE \
             WHERE employee_code = $1 AND is_active",
        )
        .bind(code)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the employee listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<Employee>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM employees e \
             JOIN roles r ON r.id = e.role_id {} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, Employee>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM employees e JOIN roles r ON r.id = e.role_id {}",
            wb.where_sql()
        );
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Number of employees referencing a role (blocks role deletion).
    pub async fn count_by_role(pool: &PgPool, role_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(pool)
            .await
    }

    // -- login bookkeeping --------------------------------------------------

    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE employees SET failed_login_count = failed_login_count + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
    }

    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE employees SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await
            .map(|_| ())
    }

    /// Reset the failure counter and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE employees SET failed_login_count = 0, locked_until = NULL, \
             last_login_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
    }
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "e.created_at DESC",
        SortKey::Oldest => "e.created_at ASC",
        SortKey::NameAsc => "e.name ASC",
        SortKey::NameDesc => "e.name DESC",
    }
}

fn build_where(eff: &Effective) -> WhereBuilder {
    let mut wb = WhereBuilder::new();
    for (domain, token) in &eff.filters {
        if matches!(domain, FilterDomain::RoleName) {
            wb.eq("r.name", BindValue::Text(token.clone()));
        }
    }
    if let Some(term) = &eff.search {
        wb.clause(
            "e.name ILIKE '%' || $? || '%'",
            BindValue::Text(term.clone()),
        );
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("e.created_at::date", from, to);
    }
    wb
}
