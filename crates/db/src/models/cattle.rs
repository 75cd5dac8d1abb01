//! Cattle entity model and DTOs.

use chrono::NaiveDate;
use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A cattle row from the `cattle` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cattle {
    pub id: DbId,
    /// Human-assigned name token, e.g. `"Kaveri-001"`. Unique.
    pub name: String,
    pub cattle_type: String,
    pub breed: String,
    pub health_status: String,
    pub gender: Option<String>,
    pub weight_kg: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub entry_date: NaiveDate,
    pub mother_name: Option<String>,
    pub is_active: bool,
    pub front_image_url: Option<String>,
    pub side_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cattle listing row: the entity plus the rolling average-milk figure
/// computed per page.
#[derive(Debug, Clone, Serialize)]
pub struct CattleListItem {
    #[serde(flatten)]
    pub cattle: Cattle,
    pub avg_milk: f64,
}

/// DTO for adding a new animal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCattle {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub cattle_type: String,
    pub breed: String,
    /// Defaults to `Healthy` if omitted.
    pub health_status: Option<String>,
    pub gender: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight_kg: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub entry_date: NaiveDate,
    pub mother_name: Option<String>,
    pub front_image_url: Option<String>,
    pub side_image_url: Option<String>,
}

/// DTO for editing an animal. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCattle {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub cattle_type: Option<String>,
    pub breed: Option<String>,
    pub health_status: Option<String>,
    pub gender: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight_kg: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub entry_date: Option<NaiveDate>,
    pub mother_name: Option<String>,
    pub is_active: Option<bool>,
    pub front_image_url: Option<String>,
    pub side_image_url: Option<String>,
}

/// Window counts for the cattle top-section dashboard.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CattleCounts {
    pub total: i64,
    pub cows: i64,
    pub buffaloes: i64,
    pub goats: i64,
    pub active: i64,
}
