//! Milk record entity model and DTOs.

use chrono::NaiveDate;
use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A milk record row: one day's production for one animal.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MilkRecord {
    pub id: DbId,
    pub cattle_id: DbId,
    pub record_date: NaiveDate,
    pub morning_litres: f64,
    pub afternoon_litres: f64,
    pub evening_litres: f64,
    pub grade: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a day's milk. The cattle is referenced by name token;
/// the handler resolves it to an id before inserting.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMilkRecord {
    #[validate(length(min = 1, max = 100))]
    pub cattle_name: String,
    pub record_date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub morning_litres: Option<f64>,
    #[validate(range(min = 0.0))]
    pub afternoon_litres: Option<f64>,
    #[validate(range(min = 0.0))]
    pub evening_litres: Option<f64>,
    pub grade: String,
}

/// DTO for editing a milk record. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMilkRecord {
    pub record_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub morning_litres: Option<f64>,
    #[validate(range(min = 0.0))]
    pub afternoon_litres: Option<f64>,
    #[validate(range(min = 0.0))]
    pub evening_litres: Option<f64>,
    pub grade: Option<String>,
}

/// Window sums for the milk dashboard cards.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct MilkSums {
    /// morning + afternoon + evening across all records in the window.
    pub total: f64,
    pub grade_a1: f64,
    pub grade_a2: f64,
}
