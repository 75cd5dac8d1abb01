//! Shared query parameter types for API handlers.
//!
//! The HTTP layer normalizes here: a lone comma-separated `filter` string
//! becomes the token list the core engine expects, date strings are parsed,
//! and a missing `page` defaults to 1. Everything after normalization is
//! validated by `herdbook_core::listing`.

use herdbook_core::error::CoreError;
use herdbook_core::listing::ListRequest;
use herdbook_core::period::{self, PeriodToken};
use herdbook_core::types::Timestamp;
use serde::Deserialize;

/// Query parameters accepted by every paginated listing endpoint
/// (`?page=&sortBy=&filter=&search=&fromDate=&toDate=`).
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// One token, or several comma-separated tokens.
    pub filter: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate")]
    pub to_date: Option<String>,
}

impl ListParams {
    /// Normalize into the core listing request.
    pub fn into_request(self) -> Result<ListRequest, CoreError> {
        let filters = self
            .filter
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(ListRequest {
            page: self.page.unwrap_or(1),
            sort_by: self.sort_by,
            filters,
            search: self.search,
            from_date: self.from_date.as_deref().map(period::parse_date).transpose()?,
            to_date: self.to_date.as_deref().map(period::parse_date).transpose()?,
        })
    }
}

/// Query parameters accepted by the dashboard endpoints: a named relative
/// period, a single date, or an explicit date range.
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub period: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate")]
    pub to_date: Option<String>,
}

impl DashboardParams {
    /// Resolve into an inclusive window. Precedence: period, then single
    /// date, then date range; no parameters at all is a validation error.
    pub fn resolve_window(&self, now: Timestamp) -> Result<(Timestamp, Timestamp), CoreError> {
        if let Some(raw) = &self.period {
            let token = PeriodToken::parse(raw)?;
            return Ok(period::relative_window(token, now));
        }
        if let Some(raw) = &self.date {
            return Ok(period::day_window(period::parse_date(raw)?));
        }
        if let (Some(f), Some(t)) = (&self.from_date, &self.to_date) {
            let from = period::parse_date(f)?;
            let to = period::parse_date(t)?;
            if from > to {
                return Err(CoreError::Validation(
                    "fromDate must not be after toDate".to_string(),
                ));
            }
            return Ok(period::range_window(from, to));
        }
        Err(CoreError::Validation(
            "Enter a valid query value {Week,Month,Quarter,Year}".to_string(),
        ))
    }
}
