//! Feed inventory models: stock lines, consumption records, history ledger.

use chrono::NaiveDate;
use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A running-balance inventory line for one named feed item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedStock {
    pub id: DbId,
    pub name: String,
    pub unit: String,
    /// Running balance; decremented on consumption, incremented on restock.
    pub quantity: f64,
    pub notes: Option<String>,
    pub record_date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedStock {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub unit: String,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    pub notes: Option<String>,
    pub record_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFeedStock {
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub record_date: Option<NaiveDate>,
}

/// DTO for `POST /feed/stock/{id}/restock`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RestockFeedStock {
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
}

/// One feed or water intake entry for one animal and session.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedConsumption {
    pub id: DbId,
    pub cattle_id: DbId,
    pub feed_name: String,
    /// `"feed"` entries reconcile against a stock line; `"water"` entries
    /// do not.
    pub feed_kind: String,
    pub session: String,
    pub quantity: f64,
    pub unit: String,
    pub record_date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedConsumption {
    #[validate(length(min = 1, max = 100))]
    pub cattle_name: String,
    #[validate(length(min = 1, max = 100))]
    pub feed_name: String,
    pub feed_kind: String,
    pub session: String,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
    pub unit: String,
    pub record_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFeedConsumption {
    pub session: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: Option<f64>,
    pub record_date: Option<NaiveDate>,
}

/// One ledger entry recording a stock-balance change.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedStockHistory {
    pub id: DbId,
    pub feed_stock_id: DbId,
    /// Set for `Consumed` entries created by a consumption record; NULL for
    /// restocks and for restores after a consumption delete.
    pub consumption_id: Option<DbId>,
    pub change_type: String,
    pub new_quantity: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// History ledger change types.
pub const CHANGE_ADDED: &str = "Added";
pub const CHANGE_CONSUMED: &str = "Consumed";
