//! Vaccination record model and DTOs.

use chrono::NaiveDate;
use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VaccinationRecord {
    pub id: DbId,
    pub cattle_id: DbId,
    pub vaccination_date: NaiveDate,
    pub vaccine_name: String,
    pub disease: Option<String>,
    pub dose: Option<String>,
    pub doctor_name: String,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVaccinationRecord {
    #[validate(length(min = 1, max = 100))]
    pub cattle_name: String,
    pub vaccination_date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub vaccine_name: String,
    pub disease: Option<String>,
    pub dose: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub doctor_name: String,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateVaccinationRecord {
    pub vaccination_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub vaccine_name: Option<String>,
    pub disease: Option<String>,
    pub dose: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub doctor_name: Option<String>,
    pub doctor_mobile: Option<String>,
    pub notes: Option<String>,
}
