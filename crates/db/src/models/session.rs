//! Refresh-token session model.

use herdbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One refresh-token session. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub employee_id: DbId,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
