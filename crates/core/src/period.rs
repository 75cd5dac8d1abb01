//! Dashboard time-window resolution.
//!
//! A dashboard window is either a named relative period (`Week`, `Month`,
//! `Quarter`, `Year`), a single calendar day, or an explicit date range.
//! All windows are inclusive: 00:00:00.000 at the lower bound, 23:59:59.999
//! at the upper bound, in UTC. "Now" is always passed in by the caller so
//! window math is testable against fixed instants.
//!
//! The `Month` window reproduces the reference system's arithmetic exactly,
//! quirks included: the start day-of-month is `getMonth() - 1` fed through
//! JS `setDate` semantics (day 0 rolls back into the previous month). See
//! DESIGN.md before "fixing" anything here.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Named relative periods accepted by the dashboard endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodToken {
    Week,
    Quarter,
    Month,
    Year,
}

impl PeriodToken {
    /// Parse a period token (case-sensitive).
    pub fn parse(raw: &str) -> Result<PeriodToken, CoreError> {
        match raw {
            "Week" => Ok(PeriodToken::Week),
            "Month" => Ok(PeriodToken::Month),
            "Quarter" => Ok(PeriodToken::Quarter),
            "Year" => Ok(PeriodToken::Year),
            _ => Err(CoreError::Validation(
                "Enter a valid query value {Week,Month,Quarter,Year}".to_string(),
            )),
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date string.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation("Please enter a valid date value".to_string()))
}

/// 00:00:00.000 UTC on the given day.
pub fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 UTC on the given day.
pub fn end_of_day(date: NaiveDate) -> Timestamp {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid wall-clock time");
    date.and_time(end).and_utc()
}

/// The inclusive window covering exactly one calendar day.
pub fn day_window(date: NaiveDate) -> (Timestamp, Timestamp) {
    (start_of_day(date), end_of_day(date))
}

/// The inclusive window covering `[from, to]` with day boundaries.
pub fn range_window(from: NaiveDate, to: NaiveDate) -> (Timestamp, Timestamp) {
    (start_of_day(from), end_of_day(to))
}

/// JS `Date.setDate` semantics: day `n` of `date`'s month, where `n <= 0`
/// rolls back into the preceding month(s).
fn js_set_date(date: NaiveDate, n: i64) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    if n >= 1 {
        first
            .checked_add_days(Days::new((n - 1) as u64))
            .unwrap_or(first)
    } else {
        first
            .checked_sub_days(Days::new((1 - n) as u64))
            .unwrap_or(first)
    }
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Resolve a relative period into an inclusive window ending today.
///
/// - `Week`: the last 6 days plus today (a 7-day window).
/// - `Month`: starts on day `month0 - 1` of the current month via
///   [`js_set_date`] -- the reference arithmetic, preserved verbatim.
/// - `Quarter`: 6 months back.
/// - `Year`: 1 year back.
pub fn relative_window(token: PeriodToken, now: Timestamp) -> (Timestamp, Timestamp) {
    let today = now.date_naive();
    let start = match token {
        PeriodToken::Week => today
            .checked_sub_days(Days::new(6))
            .unwrap_or(NaiveDate::MIN),
        PeriodToken::Month => js_set_date(today, i64::from(today.month0()) - 1),
        PeriodToken::Quarter => months_back(today, 6),
        PeriodToken::Year => months_back(today, 12),
    };
    (start_of_day(start), end_of_day(today))
}

/// The trend baseline window: the single prior calendar day.
///
/// The reference system compares every relative-period dashboard against
/// yesterday, not against a prior window of equal length.
pub fn previous_day_window(now: Timestamp) -> (Timestamp, Timestamp) {
    let today = now.date_naive();
    day_window(today.pred_opt().unwrap_or(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> Timestamp {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .expect("valid test timestamp")
            .and_utc()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // -- token parsing -----------------------------------------------------

    #[test]
    fn parses_all_period_tokens() {
        assert_eq!(PeriodToken::parse("Week").unwrap(), PeriodToken::Week);
        assert_eq!(PeriodToken::parse("Month").unwrap(), PeriodToken::Month);
        assert_eq!(PeriodToken::parse("Quarter").unwrap(), PeriodToken::Quarter);
        assert_eq!(PeriodToken::parse("Year").unwrap(), PeriodToken::Year);
    }

    #[test]
    fn unknown_period_token_fails_with_exact_message() {
        let err = PeriodToken::parse("Fortnight").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) => {
            assert_eq!(msg, "Enter a valid query value {Week,Month,Quarter,Year}");
        });
    }

    #[test]
    fn period_token_is_case_sensitive() {
        assert_matches!(PeriodToken::parse("week"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn malformed_date_rejected() {
        assert_matches!(parse_date("01-06-2023"), Err(CoreError::Validation(_)));
        assert_eq!(parse_date("2023-06-01").unwrap(), date("2023-06-01"));
    }

    // -- day boundaries ----------------------------------------------------

    #[test]
    fn day_window_is_inclusive_with_millis() {
        let (start, end) = day_window(date("2023-06-01"));
        assert_eq!(start.to_rfc3339(), "2023-06-01T00:00:00+00:00");
        assert_eq!(
            end.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2023-06-01T23:59:59.999Z"
        );
    }

    #[test]
    fn range_window_spans_both_endpoints() {
        let (start, end) = range_window(date("2023-06-01"), date("2023-06-30"));
        assert_eq!(start.date_naive(), date("2023-06-01"));
        assert_eq!(end.date_naive(), date("2023-06-30"));
        assert!(start < end);
    }

    // -- relative windows --------------------------------------------------

    #[test]
    fn week_window_is_seven_days_inclusive() {
        let (start, end) = relative_window(PeriodToken::Week, at("2023-06-15 10:30:00"));
        assert_eq!(start.date_naive(), date("2023-06-09"));
        assert_eq!(end.date_naive(), date("2023-06-15"));
    }

    #[test]
    fn month_window_reproduces_reference_arithmetic() {
        // August: month0 = 7, so setDate(6) -> the 6th of August.
        let (start, _) = relative_window(PeriodToken::Month, at("2023-08-15 00:00:00"));
        assert_eq!(start.date_naive(), date("2023-08-06"));
    }

    #[test]
    fn month_window_march() {
        // March: month0 = 2, setDate(1) -> the 1st of March.
        let (start, _) = relative_window(PeriodToken::Month, at("2023-03-20 00:00:00"));
        assert_eq!(start.date_naive(), date("2023-03-01"));
    }

    #[test]
    fn month_window_february_rolls_into_january() {
        // February: month0 = 1, setDate(0) -> the last day of January.
        let (start, _) = relative_window(PeriodToken::Month, at("2023-02-10 00:00:00"));
        assert_eq!(start.date_naive(), date("2023-01-31"));
    }

    #[test]
    fn month_window_january_rolls_into_december() {
        // January: month0 = 0, setDate(-1) -> two days before Jan 1st.
        let (start, _) = relative_window(PeriodToken::Month, at("2023-01-15 00:00:00"));
        assert_eq!(start.date_naive(), date("2022-12-30"));
    }

    #[test]
    fn quarter_window_is_six_months_back() {
        let (start, end) = relative_window(PeriodToken::Quarter, at("2023-08-15 12:00:00"));
        assert_eq!(start.date_naive(), date("2023-02-15"));
        assert_eq!(end.date_naive(), date("2023-08-15"));
    }

    #[test]
    fn year_window_is_one_year_back() {
        let (start, _) = relative_window(PeriodToken::Year, at("2023-08-15 12:00:00"));
        assert_eq!(start.date_naive(), date("2022-08-15"));
    }

    // -- trend baseline ----------------------------------------------------

    #[test]
    fn previous_day_window_is_yesterday() {
        let (start, end) = previous_day_window(at("2023-06-15 08:00:00"));
        assert_eq!(start.date_naive(), date("2023-06-14"));
        assert_eq!(end.date_naive(), date("2023-06-14"));
    }
}
