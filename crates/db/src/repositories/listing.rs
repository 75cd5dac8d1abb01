//! Shared WHERE-clause machinery for the paginated listing queries.
//!
//! Repositories translate a [`herdbook_core::listing::Effective`] into SQL
//! by pushing predicates onto a [`WhereBuilder`], which numbers the bind
//! placeholders sequentially. The same builder output drives both the page
//! query and the count query so the two can never disagree.

use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// A value bound into a dynamically built query.
#[derive(Debug, Clone)]
pub enum BindValue {
    Text(String),
    Date(NaiveDate),
}

/// Accumulates `AND`-joined predicates with sequential `$n` placeholders.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    binds: Vec<BindValue>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `expr op $n`, binding `value` as `$n`.
    pub fn cmp(&mut self, expr: &str, op: &str, value: BindValue) {
        let n = self.binds.len() + 1;
        self.clauses.push(format!("{expr} {op} ${n}"));
        self.binds.push(value);
    }

    /// Append `expr = $n`.
    pub fn eq(&mut self, expr: &str, value: BindValue) {
        self.cmp(expr, "=", value);
    }

    /// Append a clause template containing a single `$?` marker, which is
    /// replaced with the next placeholder ordinal.
    pub fn clause(&mut self, template: &str, value: BindValue) {
        let n = self.binds.len() + 1;
        self.clauses.push(template.replace("$?", &format!("${n}")));
        self.binds.push(value);
    }

    /// Append an inclusive date-range predicate on `expr`.
    pub fn date_range(&mut self, expr: &str, from: NaiveDate, to: NaiveDate) {
        self.cmp(expr, ">=", BindValue::Date(from));
        self.cmp(expr, "<=", BindValue::Date(to));
    }

    /// `""` when no predicates were pushed, `"WHERE ..."` otherwise.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// The next free placeholder ordinal (for LIMIT/OFFSET binds).
    pub fn next_ordinal(&self) -> usize {
        self.binds.len() + 1
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

/// Bind accumulated values onto a row query, in push order.
pub fn bind_rows<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    binds: &[BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for b in binds {
        q = match b {
            BindValue::Text(s) => q.bind(s.clone()),
            BindValue::Date(d) => q.bind(*d),
        };
    }
    q
}

/// Bind accumulated values onto a scalar (count) query, in push order.
pub fn bind_scalar<'q, O>(
    mut q: QueryScalar<'q, Postgres, O, PgArguments>,
    binds: &[BindValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for b in binds {
        q = match b {
            BindValue::Text(s) => q.bind(s.clone()),
            BindValue::Date(d) => q.bind(*d),
        };
    }
    q
}
