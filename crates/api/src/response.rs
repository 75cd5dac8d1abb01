//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "message": ..., "data": ... }` envelope. Use
//! [`MessageResponse`] instead of ad-hoc `serde_json::json!` so the shape is
//! type-checked and serialized consistently. Paginated listings wrap their
//! page in [`ListData`], which carries the count metadata the clients page
//! with.

use herdbook_core::paging;
use serde::Serialize;

/// Standard `{ "message": ..., "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> MessageResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        MessageResponse {
            message: message.into(),
            data,
        }
    }
}

/// The data payload of a paginated listing.
#[derive(Debug, Serialize)]
pub struct ListData<T: Serialize> {
    pub items: Vec<T>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T: Serialize> ListData<T> {
    /// Wrap a page of items with its count metadata.
    pub fn new(items: Vec<T>, total_count: i64) -> Self {
        ListData {
            items,
            total_count,
            total_pages: paging::total_pages(total_count),
        }
    }
}
