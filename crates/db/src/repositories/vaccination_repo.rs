//! Repository for the `vaccination_records` table.

use chrono::NaiveDate;
use herdbook_core::listing::{Effective, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::vaccination::{
    CreateVaccinationRecord, UpdateVaccinationRecord, VaccinationRecord,
};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries, prefixed for the cattle join used by
/// the listing.
const COLUMNS: &str = "\
    v.id, v.cattle_id, v.vaccination_date, v.vaccine_name, v.disease, v.dose, \
    v.doctor_name, v.doctor_mobile, v.notes, v.created_at, v.updated_at";

/// Provides CRUD, listing, and dashboard counts for vaccination records.
pub struct VaccinationRepo;

impl VaccinationRepo {
    pub async fn create(
        pool: &PgPool,
        cattle_id: DbId,
        input: &CreateVaccinationRecord,
    ) -> Result<VaccinationRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO vaccination_records AS v \
                (cattle_id, vaccination_date, vaccine_name, disease, dose, \
                 doctor_name, doctor_mobile, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VaccinationRecord>(&query)
            .bind(cattle_id)
            .bind(input.vaccination_date)
            .bind(&input.vaccine_name)
            .bind(&input.disease)
            .bind(&input.dose)
            .bind(&input.doctor_name)
            .bind(&input.doctor_mobile)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VaccinationRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vaccination_records v WHERE v.id = $1");
        sqlx::query_as::<_, VaccinationRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVaccinationRecord,
    ) -> Result<Option<VaccinationRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE vaccination_records AS v SET
                vaccination_date = COALESCE($2, vaccination_date),
                vaccine_name = COALESCE($3, vaccine_name),
                disease = COALESCE($4, disease),
                dose = COALESCE($5, dose),
                doctor_name = COALESCE($6, doctor_name),
                doctor_mobile = COALESCE($7, doctor_mobile),
                notes = COALESCE($8, notes)
             WHERE v.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VaccinationRecord>(&query)
            .bind(id)
            .bind(input.vaccination_date)
            .bind(&input.vaccine_name)
            .bind(&input.disease)
            .bind(&input.dose)
            .bind(&input.doctor_name)
            .bind(&input.doctor_mobile)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vaccination_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the vaccination listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<VaccinationRecord>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM vaccination_records v \
             JOIN cattle c ON c.id = v.cattle_id {} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, VaccinationRecord>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM vaccination_records v JOIN cattle c ON c.id = v.cattle_id {}",
            wb.where_sql()
        );
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Number of vaccinations whose date falls in the window.
    pub async fn count_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vaccination_records \
             WHERE vaccination_date >= $1 AND vaccination_date <= $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "v.vaccination_date DESC, v.id DESC",
        SortKey::Oldest => "v.vaccination_date ASC, v.id ASC",
        // Name sorts are rejected at planning time for this entity.
        SortKey::NameAsc | SortKey::NameDesc => "v.vaccination_date DESC, v.id DESC",
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
        wb.date_range("v.vaccination_date", from, to);
    }
    wb
}
