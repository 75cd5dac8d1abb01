//! Repository for the `checkup_records` table.

use chrono::NaiveDate;
use herdbook_core::listing::{Effective, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::checkup::{CheckupRecord, CreateCheckupRecord, UpdateCheckupRecord};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries, prefixed for the cattle join used by
/// the listing.
const COLUMNS: &str = "\
    h.id, h.cattle_id, h.checkup_date, h.symptoms, h.diagnosis, h.treatment, \
    h.doctor_name, h.doctor_mobile, h.notes, h.created_at, h.updated_at";

/// Provides CRUD, listing, and dashboard counts for checkup records.
pub struct CheckupRepo;

impl CheckupRepo {
    pub async fn create(
        pool: &PgPool,
        cattle_id: DbId,
        input: &CreateCheckupRecord,
    ) -> Result<CheckupRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO checkup_records AS h \
                (cattle_id, checkup_date, symptoms, diagnosis, treatment, \
                 doctor_name, doctor_mobile, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CheckupRecord>(&query)
            .bind(cattle_id)
            .bind(input.checkup_date)
            .bind(&input.symptoms)
            .bind(&input.diagnosis)
            .bind(&input.treatment)
            .bind(&input.doctor_name)
            .bind(&input.doctor_mobile)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CheckupRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checkup_records h WHERE h.id = $1");
        sqlx::query_as::<_, CheckupRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCheckupRecord,
    ) -> Result<Option<CheckupRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE checkup_records AS h SET
                checkup_date = COALESCE($2, checkup_date),
                symptoms = COALESCE($3, symptoms),
                diagnosis = COALESCE($4, diagnosis),
                treatment = COALESCE($5, treatment),
                doctor_name = COALESCE($6, doctor_name),
                doctor_mobile = COALESCE($7, doctor_mobile),
                notes = COALESCE($8, notes)
             WHERE h.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CheckupRecord>(&query)
            .bind(id)
            .bind(input.checkup_date)
            .bind(&input.symptoms)
            .bind(&input.diagnosis)
            .bind(&input.treatment)
            .bind(&input.doctor_name)
            .bind(&input.doctor_mobile)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checkup_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the checkup listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<CheckupRecord>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM checkup_records h \
             JOIN cattle c ON c.id = h.cattle_id {} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, CheckupRecord>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM checkup_records h JOIN cattle c ON c.id = h.cattle_id {}",
            wb.where_sql()
        );
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Number of checkups whose date falls in the window.
    pub async fn count_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM checkup_records WHERE checkup_date >= $1 AND checkup_date <= $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "h.checkup_date DESC, h.id DESC",
        SortKey::Oldest => "h.checkup_date ASC, h.id ASC",
        // Name sorts are rejected at planning time for this entity.
        SortKey::NameAsc | SortKey::NameDesc => "h.checkup_date DESC, h.id DESC",
    }
}

fn build_where(eff: &Effective) -> WhereBuilder {
    let mut wb = WhereBuilder::new();
    if let Some(term) = &eff.search {
        wb.clause(
            "c.name ILIKE '%' || $? || '%'",
            BindValue::Text(term.clone()),
        );
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("h.checkup_date", from, to);
    }
    wb
}
