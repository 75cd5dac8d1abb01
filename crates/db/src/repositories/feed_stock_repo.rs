//! Repository for the `feed_stock` and `feed_stock_history` tables.

use herdbook_core::listing::{Effective, FilterDomain, SortKey};
use herdbook_core::paging::PAGE_SIZE;
use herdbook_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::feed::{
    CreateFeedStock, FeedStock, FeedStockHistory, UpdateFeedStock, CHANGE_ADDED,
};
use crate::repositories::listing::{bind_rows, bind_scalar, BindValue, WhereBuilder};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, name, unit, quantity, notes, record_date, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, feed_stock_id, consumption_id, change_type, new_quantity, created_at, updated_at";

/// Provides CRUD, restock, listing, and history access for stock lines.
pub struct FeedStockRepo;

impl FeedStockRepo {
    /// Insert a new stock line, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFeedStock) -> Result<FeedStock, sqlx::Error> {
        let query = format!(
            "INSERT INTO feed_stock (name, unit, quantity, notes, record_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeedStock>(&query)
            .bind(&input.name)
            .bind(&input.unit)
            .bind(input.quantity)
            .bind(&input.notes)
            .bind(input.record_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FeedStock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feed_stock WHERE id = $1");
        sqlx::query_as::<_, FeedStock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<FeedStock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feed_stock WHERE name = $1");
        sqlx::query_as::<_, FeedStock>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Update the descriptive fields of a stock line. The balance is only
    /// ever changed through restock and consumption reconciliation.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFeedStock,
    ) -> Result<Option<FeedStock>, sqlx::Error> {
        let query = format!(
            "UPDATE feed_stock SET
                unit = COALESCE($2, unit),
                notes = COALESCE($3, notes),
                record_date = COALESCE($4, record_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeedStock>(&query)
            .bind(id)
            .bind(&input.unit)
            .bind(&input.notes)
            .bind(input.record_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a stock line by id. History rows cascade. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feed_stock WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment a stock balance and record an `Added` history row, as one
    /// transaction. Returns `None` if the stock line does not exist.
    pub async fn restock(
        pool: &PgPool,
        id: DbId,
        quantity: f64,
    ) -> Result<Option<FeedStock>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE feed_stock SET quantity = quantity + $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, FeedStock>(&query)
            .bind(id)
            .bind(quantity)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(stock) = updated else {
            return Ok(None);
        };
        insert_history(&mut *tx, stock.id, None, CHANGE_ADDED, stock.quantity).await?;
        tx.commit().await?;
        Ok(Some(stock))
    }

    /// One page of the stock listing plus the total matching count.
    pub async fn list(
        pool: &PgPool,
        eff: &Effective,
        skip: i64,
    ) -> Result<(Vec<FeedStock>, i64), sqlx::Error> {
        let wb = build_where(eff);
        let order = order_sql(eff.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM feed_stock {} ORDER BY {order} LIMIT ${} OFFSET ${}",
            wb.where_sql(),
            wb.next_ordinal(),
            wb.next_ordinal() + 1
        );
        let items = bind_rows(sqlx::query_as::<_, FeedStock>(&query), wb.binds())
            .bind(PAGE_SIZE)
            .bind(skip)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM feed_stock {}", wb.where_sql());
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_query), wb.binds())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// The history ledger for one stock line, newest first.
    pub async fn history(
        pool: &PgPool,
        stock_id: DbId,
    ) -> Result<Vec<FeedStockHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM feed_stock_history \
             WHERE feed_stock_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FeedStockHistory>(&query)
            .bind(stock_id)
            .fetch_all(pool)
            .await
    }
}

/// Append one history ledger row inside an open transaction.
pub(crate) async fn insert_history(
    conn: &mut PgConnection,
    feed_stock_id: DbId,
    consumption_id: Option<DbId>,
    change_type: &str,
    new_quantity: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO feed_stock_history (feed_stock_id, consumption_id, change_type, new_quantity)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(feed_stock_id)
    .bind(consumption_id)
    .bind(change_type)
    .bind(new_quantity)
    .execute(conn)
    .await
    .map(|_| ())
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
        if matches!(domain, FilterDomain::Unit) {
            wb.eq("unit", BindValue::Text(token.clone()));
        }
    }
    if let Some(term) = &eff.search {
        wb.clause("name ILIKE '%' || $? || '%'", BindValue::Text(term.clone()));
    }
    if let Some((from, to)) = eff.date_range {
        wb.date_range("record_date", from, to);
    }
    wb
}
