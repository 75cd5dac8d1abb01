//! Repository for the `milk_records` table.

use chrono::NaiveDate;
use herdbook_core::listing::{Effective, FilterDomain, SortKey, MILK_GRADES};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::milk::{CreateMilkRecord, MilkRecord, MilkSums, UpdateMilkRecord};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries, prefixed for the cattle join used by
/// the listing.
const COLUMNS: &str = "\
    m.id, m.cattle_id, m.record_date, m.morning_litres, m.afternoon_litres, \
    m.evening_litres, m.grade, m.created_at, m.updated_at";

/// Provides CRUD, listing, and dashboard sums for milk records.
pub struct MilkRecordRepo;

impl MilkRecordRepo {
    /// Insert a record for an already-resolved cattle id. Missing session
    /// quantities default to 0.
    pub async fn create(
        pool: &PgPool,
        cattle_id: DbId,
        input: &CreateMilkRecord,
    ) -> Result<MilkRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO milk_records AS m \
                (cattle_id, record_date, morning_litres, afternoon_litres, evening_litres, grade)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 0), COALESCE($5, 0), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MilkRecord>(&query)
            .bind(cattle_id)
            .bind(input.record_date)
            .bind(input.morning_litres)
            .bind(input.afternoon_litres)
            .bind(input.evening_litres)
            .bind(&input.grade)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MilkRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milk_records m WHERE m.id = $1");
        sqlx::query_as::<_, MilkRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a record. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMilkRecord,
    ) -> Result<Option<MilkRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE milk_records AS m SET
                record_date = COALESCE($2, record_date),
                morning_litres = COALESCE($3, morning_litres),
                afternoon_litres = COALESCE($4, afternoon_litres),
                evening_litres = COALESCE($5, evening_litres),
                grade = COALESCE($6, grade)
             WHERE m.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MilkRecord>(&query)
            .bind(id)
            .bind(input.record_date)
            .bind(input.morning_litres)
            .bind(input.afternoon_litres)
            .bind(input.evening_litres)
            .bind(&input.grade)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM milk_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the milk listing plus the total matching count.
    ///
    /// Joins the cattle table so the search term can match the animal's
    /// name; a term that literally equals a known grade matches the grade
    /// column exactly instead.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<MilkRecord>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM milk_records m \
             JOIN cattle c ON c.id = m.cattle_id {} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, MilkRecord>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM milk_records m JOIN cattle c ON c.id = m.cattle_id {}",
            wb.where_sql()
        );
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Dashboard sums over records whose date falls in the window.
    pub async fn sums_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<MilkSums, sqlx::Error> {
        sqlx::query_as::<_, MilkSums>(
            "SELECT COALESCE(SUM(morning_litres + afternoon_litres + evening_litres), 0) AS total,
                    COALESCE(SUM(morning_litres + afternoon_litres + evening_litres) \
                        FILTER (WHERE grade = 'A1'), 0) AS grade_a1,
                    COALESCE(SUM(morning_litres + afternoon_litres + evening_litres) \
                        FILTER (WHERE grade = 'A2'), 0) AS grade_a2
             FROM milk_records
             WHERE record_date >= $1 AND record_date <= $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "m.record_date DESC, m.id DESC",
        SortKey::Oldest => "m.record_date ASC, m.id ASC",
        // Name sorts are rejected at planning time for this entity.
        SortKey::NameAsc | SortKey::NameDesc => "m.record_date DESC, m.id DESC",
    }
}

fn build_where(eff: &Effective) -> WhereBuilder {
    let mut wb = WhereBuilder::new();
    for (domain, token) in &eff.filters {
        if matches!(domain, FilterDomain::Grade) {
            wb.eq("m.grade", BindValue::Text(token.clone()));
        }
    }
    if let Some(term) = &eff.search {
        if MILK_GRADES.contains(&term.as_str()) {
            wb.eq("m.grade", BindValue::Text(term.clone()));
        } else {
            wb.clause(
                "c.name ILIKE '%' || $? || '%'",
                BindValue::Text(term.clone()),
            );
        }
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("m.record_date", from, to);
    }
    wb
}
