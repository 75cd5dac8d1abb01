//! Repository for the `feed_consumption` table.
//!
//! Non-water consumption is reconciled against a stock line: every create,
//! quantity edit, and delete runs as a single transaction covering the
//! consumption row, the stock balance, and the history ledger entry, so a
//! crash can never leave the three out of step.

use herdbook_core::listing::{Effective, FilterDomain, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::feed::{
    CreateFeedConsumption, FeedConsumption, FeedStock, UpdateFeedConsumption, CHANGE_ADDED,
    CHANGE_CONSUMED,
};
use crate::repositories::feed_stock_repo::{insert_history, COLUMNS as STOCK_COLUMNS};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries, prefixed for the cattle join used by
/// the listing.
const COLUMNS: &str = "\
    f.id, f.cattle_id, f.feed_name, f.feed_kind, f.session, f.quantity, \
    f.unit, f.record_date, f.created_at, f.updated_at";

/// Outcome of a stock-reconciled mutation.
#[derive(Debug)]
pub enum StockReconcile<T> {
    Done(T),
    /// No stock line with the consumption's feed name exists.
    StockNotFound,
    /// The requested quantity exceeds the available balance.
    InsufficientStock { available: f64 },
}

/// Provides reconciled CRUD and listing for consumption records.
pub struct FeedConsumptionRepo;

impl FeedConsumptionRepo {
    /// Insert a consumption record for an already-resolved cattle id.
    ///
    /// `water` entries insert directly. `feed` entries lock the stock line,
    /// verify the balance, decrement it, and append a `Consumed` history
    /// row referencing the new record, all in one transaction.
    pub async fn create(
        pool: &PgPool,
        cattle_id: DbId,
        input: &CreateFeedConsumption,
    ) -> Result<StockReconcile<FeedConsumption>, sqlx::Error> {
        if input.feed_kind != "feed" {
            let record = insert_record(pool, cattle_id, input).await?;
            return Ok(StockReconcile::Done(record));
        }

        let mut tx = pool.begin().await?;
        let Some(stock) = lock_stock(&mut tx, &input.feed_name).await? else {
            return Ok(StockReconcile::StockNotFound);
        };
        if stock.quantity < input.quantity {
            return Ok(StockReconcile::InsufficientStock {
                available: stock.quantity,
            });
        }

        let query = format!(
            "INSERT INTO feed_consumption AS f \
                (cattle_id, feed_name, feed_kind, session, quantity, unit, record_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, FeedConsumption>(&query)
            .bind(cattle_id)
            .bind(&input.feed_name)
            .bind(&input.feed_kind)
            .bind(&input.session)
            .bind(input.quantity)
            .bind(&input.unit)
            .bind(input.record_date)
            .fetch_one(&mut *tx)
            .await?;

        let new_quantity = decrement_stock(&mut tx, stock.id, input.quantity).await?;
        insert_history(
            &mut *tx,
            stock.id,
            Some(record.id),
            CHANGE_CONSUMED,
            new_quantity,
        )
        .await?;

        tx.commit().await?;
        Ok(StockReconcile::Done(record))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FeedConsumption>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feed_consumption f WHERE f.id = $1");
        sqlx::query_as::<_, FeedConsumption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a consumption record, adjusting the paired stock balance by
    /// the quantity delta when the record is a `feed` entry.
    pub async fn update(
        pool: &PgPool,
        existing: &FeedConsumption,
        input: &UpdateFeedConsumption,
    ) -> Result<StockReconcile<FeedConsumption>, sqlx::Error> {
        let new_quantity = input.quantity.unwrap_or(existing.quantity);
        let delta = new_quantity - existing.quantity;

        if existing.feed_kind != "feed" || delta == 0.0 {
            let record = apply_update(pool, existing.id, input).await?;
            return Ok(StockReconcile::Done(record));
        }

        let mut tx = pool.begin().await?;
        let Some(stock) = lock_stock(&mut tx, &existing.feed_name).await? else {
            return Ok(StockReconcile::StockNotFound);
        };
        if delta > 0.0 && stock.quantity < delta {
            return Ok(StockReconcile::InsufficientStock {
                available: stock.quantity,
            });
        }

        let query = format!(
            "UPDATE feed_consumption AS f SET
                session = COALESCE($2, session),
                quantity = COALESCE($3, quantity),
                record_date = COALESCE($4, record_date)
             WHERE f.id = $1
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, FeedConsumption>(&query)
            .bind(existing.id)
            .bind(&input.session)
            .bind(input.quantity)
            .bind(input.record_date)
            .fetch_one(&mut *tx)
            .await?;

        let balance = decrement_stock(&mut tx, stock.id, delta).await?;
        let change_type = if delta > 0.0 {
            CHANGE_CONSUMED
        } else {
            CHANGE_ADDED
        };
        insert_history(&mut *tx, stock.id, Some(record.id), change_type, balance).await?;

        tx.commit().await?;
        Ok(StockReconcile::Done(record))
    }

    /// Delete a consumption record, restoring the consumed quantity to the
    /// stock line (when one still exists) with an `Added` history row.
    ///
    /// A `feed` record whose stock line has since been deleted is removed
    /// without a restore rather than being left undeletable.
    pub async fn delete(pool: &PgPool, existing: &FeedConsumption) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stock = if existing.feed_kind == "feed" {
            lock_stock(&mut tx, &existing.feed_name).await?
        } else {
            None
        };

        let result = sqlx::query("DELETE FROM feed_consumption WHERE id = $1")
            .bind(existing.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(stock) = stock {
            let balance = decrement_stock(&mut tx, stock.id, -existing.quantity).await?;
            insert_history(&mut *tx, stock.id, None, CHANGE_ADDED, balance).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// One page of the consumption listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<FeedConsumption>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM feed_consumption f \
             JOIN cattle c ON c.id = f.cattle_id {} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, FeedConsumption>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM feed_consumption f JOIN cattle c ON c.id = f.cattle_id {}",
            wb.where_sql()
        );
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }
}

/// Plain insert without stock reconciliation (water entries).
async fn insert_record(
    pool: &PgPool,
    cattle_id: DbId,
    input: &CreateFeedConsumption,
) -> Result<FeedConsumption, sqlx::Error> {
    let query = format!(
        "INSERT INTO feed_consumption AS f \
            (cattle_id, feed_name, feed_kind, session, quantity, unit, record_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, FeedConsumption>(&query)
        .bind(cattle_id)
        .bind(&input.feed_name)
        .bind(&input.feed_kind)
        .bind(&input.session)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(input.record_date)
        .fetch_one(pool)
        .await
}

/// Plain update without stock reconciliation.
async fn apply_update(
    pool: &PgPool,
    id: DbId,
    input: &UpdateFeedConsumption,
) -> Result<FeedConsumption, sqlx::Error> {
    let query = format!(
        "UPDATE feed_consumption AS f SET
            session = COALESCE($2, session),
            quantity = COALESCE($3, quantity),
            record_date = COALESCE($4, record_date)
         WHERE f.id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, FeedConsumption>(&query)
        .bind(id)
        .bind(&input.session)
        .bind(input.quantity)
        .bind(input.record_date)
        .fetch_one(pool)
        .await
}

/// Lock the stock line for a feed name for the duration of the transaction.
async fn lock_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    feed_name: &str,
) -> Result<Option<FeedStock>, sqlx::Error> {
    let query = format!("SELECT {STOCK_COLUMNS} FROM feed_stock WHERE name = $1 FOR UPDATE");
    sqlx::query_as::<_, FeedStock>(&query)
        .bind(feed_name)
        .fetch_optional(&mut **tx)
        .await
}

/// Subtract `delta` from a stock balance (negative restores), returning the
/// new balance.
async fn decrement_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    stock_id: DbId,
    delta: f64,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "UPDATE feed_stock SET quantity = quantity - $2 WHERE id = $1 RETURNING quantity",
    )
    .bind(stock_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await
}

fn order_sql(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "f.record_date DESC, f.id DESC",
        SortKey::Oldest => "f.record_date ASC, f.id ASC",
        // Name sorts are rejected at planning time for this entity.
        SortKey::NameAsc | SortKey::NameDesc => "f.record_date DESC, f.id DESC",
    }
}

fn build_where(eff: &Effective) -> WhereBuilder {
    let mut wb = WhereBuilder::new();
    for (domain, token) in &eff.filters {
        let column = match domain {
            FilterDomain::FeedKind => "f.feed_kind",
            FilterDomain::Session => "f.session",
            FilterDomain::Unit => "f.unit",
            _ => continue,
        };
        wb.eq(column, BindValue::Text(token.clone()));
    }
    if let Some(term) = &eff.search {
        wb.clause(
            "c.name ILIKE '%' || $? || '%'",
            BindValue::Text(term.clone()),
        );
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("f.record_date", from, to);
    }
    wb
}
