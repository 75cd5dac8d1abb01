/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (milk/feed/checkup record dates) carry no time component.
pub type Date = chrono::NaiveDate;
