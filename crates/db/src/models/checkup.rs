//! Health checkup record model and DTOs.

use chrono::NaiveDate;
use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CheckupRecord {
    pub id: DbId,
    pub cattle_id: DbId,
    pub checkup_date: NaiveDate,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub doctor_name: String,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCheckupRecord {
    #[validate(length(min = 1, max = 100))]
    pub cattle_name: String,
    pub checkup_date: NaiveDate,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub doctor_name: String,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCheckupRecord {
    pub checkup_date: Option<NaiveDate>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub doctor_name: Option<String>,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
}
