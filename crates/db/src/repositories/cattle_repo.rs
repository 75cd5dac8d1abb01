//! Repository for the `cattle` table.

use herdbook_core::listing::{Effective, FilterDomain, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::cattle::{Cattle, CattleCounts, CreateCattle, UpdateCattle};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, cattle_type, breed, health_status, gender, weight_kg, \
    birth_date, entry_date, mother_name, is_active, front_image_url, \
    side_image_url, created_at, updated_at";

/// Provides CRUD, listing, and dashboard aggregates for cattle.
pub struct CattleRepo;

impl CattleRepo {
    /// Insert a new animal, returning the created row.
    ///
    /// If `health_status` is `None`, defaults to `Healthy` (DB default).
    pub async fn create(pool: &PgPool, input: &CreateCattle) -> Result<Cattle, sqlx::Error> {
        let query = format!(
            "INSERT INTO cattle (name, cattle_type, breed, health_status, gender, \
                weight_kg, birth_date, entry_date, mother_name, front_image_url, side_image_url)
             VALUES ($1, $2, $3, COALESCE($4, 'Healthy'), $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(&input.name)
            .bind(&input.cattle_type)
            .bind(&input.breed)
            .bind(&input.health_status)
            .bind(&input.gender)
            .bind(input.weight_kg)
            .bind(input.birth_date)
            .bind(input.entry_date)
            .bind(&input.mother_name)
            .bind(&input.front_image_url)
            .bind(&input.side_image_url)
            .fetch_one(pool)
            .await
    }

    /// Find an animal by its name token.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cattle WHERE name = $1");
        sqlx::query_as::<_, Cattle>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Update an animal by name. Only non-`None` fields in `input` are
    /// applied. Returns `None` if no row with the given name exists.
    pub async fn update_by_name(
        pool: &PgPool,
        name: &str,
        input: &UpdateCattle,
    ) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!(
            "UPDATE cattle SET
                name = COALESCE($2, name),
                cattle_type = COALESCE($3, cattle_type),
                breed = COALESCE($4, breed),
                health_status = COALESCE($5, health_status),
                gender = COALESCE($6, gender),
                weight_kg = COALESCE($7, weight_kg),
                birth_date = COALESCE($8, birth_date),
                entry_date = COALESCE($9, entry_date),
                mother_name = COALESCE($10, mother_name),
                is_active = COALESCE($11, is_active),
                front_image_url = COALESCE($12, front_image_url),
                side_image_url = COALESCE($13, side_image_url)
             WHERE name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(name)
            .bind(&input.name)
            .bind(&input.cattle_type)
            .bind(&input.breed)
            .bind(&input.health_status)
            .bind(&input.gender)
            .bind(input.weight_kg)
            .bind(input.birth_date)
            .bind(input.entry_date)
            .bind(&input.mother_name)
            .bind(input.is_active)
            .bind(&input.front_image_url)
            .bind(&input.side_image_url)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an animal by name. Dependent milk/feed/health rows
    /// cascade. Returns `true` if a row was removed.
    pub async fn delete_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cattle WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the cattle listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<Cattle>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM cattle {} ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, Cattle>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM cattle {}", wb.where_sql());
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Per-session milk averages for a set of animals, one row per animal
    /// that has milk records: `(cattle_id, avg_morning, avg_afternoon,
    /// avg_evening)`.
    ///
    /// Batches the per-row enrichment of the cattle listing into a single
    /// grouped query.
    pub async fn milk_averages(
        pool: &PgPool,
        cattle_ids: &[DbId],
    ) -> Result<Vec<(DbId, f64, f64, f64)>, sqlx::Error> {
        if cattle_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, (DbId, f64, f64, f64)>(
            "SELECT cattle_id, AVG(morning_litres), AVG(afternoon_litres), AVG(evening_litres)
             FROM milk_records
             WHERE cattle_id = ANY($1)
             GROUP BY cattle_id",
        )
        .bind(cattle_ids.to_vec())
        .fetch_all(pool)
        .await
    }

    /// Dashboard counts for animals whose entry date falls in the window.
    pub async fn counts_between(
        pool: &PgPool,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<CattleCounts, sqlx::Error> {
        sqlx::query_as::<_, CattleCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE cattle_type = 'Cow') AS cows,
                    COUNT(*) FILTER (WHERE cattle_type = 'Buffalo') AS buffaloes,
                    COUNT(*) FILTER (WHERE cattle_type = 'Goat') AS goats,
                    COUNT(*) FILTER (WHERE is_active) AS active
             FROM cattle
             WHERE entry_date >= $1 AND entry_date <= $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
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
    for (domain, token) in &eff.filters {
        let column = match domain {
            FilterDomain::CattleType => "cattle_type",
            FilterDomain::Breed => "breed",
            FilterDomain::HealthStatus => "health_status",
            // Other domains never reach this entity (closed set in core).
            _ => continue,
        };
        wb.eq(column, BindValue::Text(token.clone()));
    }
    if let Some(term) = &eff.search {
        wb.clause("name ILIKE '%' || $? || '%'", BindValue::Text(term.clone()));
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("entry_date", from, to);
    }
    wb
}
