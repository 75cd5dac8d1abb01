//! Typed axes of the paginated list-filter-sort-search engine.
//!
//! Every listing endpoint (cattle, milk, feed consumption, feed stock,
//! checkups, vaccinations, employees, roles) goes through the same planning
//! step: validate the page number, resolve the sort key against the entity's
//! allowed set, resolve each filter token against the entity's categorical
//! domains, and determine which stage drives the response message.
//!
//! Sort keys, filter domains, and the per-entity merge strategy are closed
//! enums rather than raw strings, so an unrecognized value fails fast with a
//! validation error instead of silently returning empty results.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::paging;

// ---------------------------------------------------------------------------
// Categorical domains
// ---------------------------------------------------------------------------

/// Filter tokens are matched case-sensitively against these closed sets.
pub const CATTLE_TYPES: &[&str] = &["Cow", "Buffalo", "Goat"];

pub const CATTLE_BREEDS: &[&str] = &[
    "Gir",
    "Sahiwal",
    "Red Sindhi",
    "Tharparkar",
    "Murrah",
    "Jaffarabadi",
    "Surti",
    "Jamunapari",
    "Beetal",
    "Sirohi",
];

pub const HEALTH_STATUSES: &[&str] = &["Healthy", "Sick", "Under Treatment"];

pub const MILK_GRADES: &[&str] = &["A1", "A2"];

pub const SESSIONS: &[&str] = &["Morning", "Afternoon", "Evening"];

pub const FEED_KINDS: &[&str] = &["water", "feed"];

pub const UNITS: &[&str] = &["kg", "litre", "gram"];

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

/// Closed set of sort keys. Entities without a name column allow only
/// `newest`/`oldest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Parse a raw sort token against the entity's allowed set.
    ///
    /// An unknown or disallowed token is a validation error; it never falls
    /// back to the default sort.
    pub fn parse(raw: &str, allowed: &[SortKey]) -> Result<SortKey, CoreError> {
        let key = match raw {
            "newest" => SortKey::Newest,
            "oldest" => SortKey::Oldest,
            "name-asc" => SortKey::NameAsc,
            "name-desc" => SortKey::NameDesc,
            _ => {
                return Err(CoreError::Validation(
                    "Please enter a valid sortBy value".to_string(),
                ))
            }
        };
        if !allowed.contains(&key) {
            return Err(CoreError::Validation(
                "Please enter a valid sortBy value".to_string(),
            ));
        }
        Ok(key)
    }
}

/// Sort sets shared by the listing configs.
pub const SORTS_WITH_NAME: &[SortKey] = &[
    SortKey::Newest,
    SortKey::Oldest,
    SortKey::NameAsc,
    SortKey::NameDesc,
];

pub const SORTS_DATE_ONLY: &[SortKey] = &[SortKey::Newest, SortKey::Oldest];

// ---------------------------------------------------------------------------
// Filter domains
// ---------------------------------------------------------------------------

/// One categorical axis a filter token can match.
///
/// Each entity lists its domains in priority order; the first domain that
/// contains a token determines the query predicate for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDomain {
    CattleType,
    Breed,
    HealthStatus,
    Grade,
    Session,
    FeedKind,
    Unit,
    /// Role names are registry-backed, not a compile-time set. Any token is
    /// accepted here; the caller must confirm the role exists before
    /// querying and reject the token otherwise.
    RoleName,
}

impl FilterDomain {
    /// Case-sensitive membership test for a filter token.
    pub fn contains(&self, token: &str) -> bool {
        match self {
            FilterDomain::CattleType => CATTLE_TYPES.contains(&token),
            FilterDomain::Breed => CATTLE_BREEDS.contains(&token),
            FilterDomain::HealthStatus => HEALTH_STATUSES.contains(&token),
            FilterDomain::Grade => MILK_GRADES.contains(&token),
            FilterDomain::Session => SESSIONS.contains(&token),
            FilterDomain::FeedKind => FEED_KINDS.contains(&token),
            FilterDomain::Unit => UNITS.contains(&token),
            FilterDomain::RoleName => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Merge strategy
// ---------------------------------------------------------------------------

/// How triggered stages combine into the executed query.
///
/// The reference system is inconsistent across modules: the cattle and milk
/// paths re-query with only the last triggered stage's predicate, while the
/// remaining entities AND-compose every triggered stage. The strategy is
/// per-entity data so either behavior can be changed without touching the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The last triggered stage's predicate replaces the base query.
    ReplaceLast,
    /// All triggered stages AND-compose.
    Cumulative,
}

// ---------------------------------------------------------------------------
// Per-entity listing configuration
// ---------------------------------------------------------------------------

/// Static listing configuration for one entity.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub entity: &'static str,
    pub allowed_sorts: &'static [SortKey],
    pub domains: &'static [FilterDomain],
    pub strategy: MergeStrategy,
}

pub const CATTLE_LISTING: ListingConfig = ListingConfig {
    entity: "Cattle",
    allowed_sorts: SORTS_WITH_NAME,
    domains: &[
        FilterDomain::CattleType,
        FilterDomain::Breed,
        FilterDomain::HealthStatus,
    ],
    strategy: MergeStrategy::ReplaceLast,
};

pub const MILK_LISTING: ListingConfig = ListingConfig {
    entity: "Milk record",
    allowed_sorts: SORTS_DATE_ONLY,
    domains: &[FilterDomain::Grade],
    strategy: MergeStrategy::ReplaceLast,
};

pub const FEED_CONSUMPTION_LISTING: ListingConfig = ListingConfig {
    entity: "Feed record",
    allowed_sorts: SORTS_DATE_ONLY,
    domains: &[
        FilterDomain::FeedKind,
        FilterDomain::Session,
        FilterDomain::Unit,
    ],
    strategy: MergeStrategy::Cumulative,
};

pub const FEED_STOCK_LISTING: ListingConfig = ListingConfig {
    entity: "Feed stock",
    allowed_sorts: SORTS_WITH_NAME,
    domains: &[FilterDomain::Unit],
    strategy: MergeStrategy::Cumulative,
};

pub const CHECKUP_LISTING: ListingConfig = ListingConfig {
    entity: "Checkup record",
    allowed_sorts: SORTS_DATE_ONLY,
    domains: &[],
    strategy: MergeStrategy::Cumulative,
};

pub const VACCINATION_LISTING: ListingConfig = ListingConfig {
    entity: "Vaccination record",
    allowed_sorts: SORTS_DATE_ONLY,
    domains: &[],
    strategy: MergeStrategy::Cumulative,
};

pub const EMPLOYEE_LISTING: ListingConfig = ListingConfig {
    entity: "Employee",
    allowed_sorts: SORTS_WITH_NAME,
    domains: &[FilterDomain::RoleName],
    strategy: MergeStrategy::Cumulative,
};

pub const ROLE_LISTING: ListingConfig = ListingConfig {
    entity: "Role",
    allowed_sorts: SORTS_WITH_NAME,
    domains: &[],
    strategy: MergeStrategy::Cumulative,
};

// ---------------------------------------------------------------------------
// Request planning
// ---------------------------------------------------------------------------

/// Raw listing parameters after HTTP-level normalization (single filter
/// string already expanded to a one-element list, dates already parsed).
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub page: i64,
    pub sort_by: Option<String>,
    pub filters: Vec<String>,
    pub search: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// The stage that last triggered, in the fixed order
/// sort -> filter -> search -> date-range. Drives the response message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Initial,
    Sorted,
    Filtered,
    Searched(String),
    DateRange(NaiveDate, NaiveDate),
}

impl Stage {
    /// The human-readable status message for the response envelope.
    ///
    /// Callers assert on these strings verbatim; casing is intentionally
    /// uneven (it matches the reference system).
    pub fn message(&self) -> String {
        match self {
            Stage::Initial => "showing the initial paginated data".to_string(),
            Stage::Sorted => "showing the sorted data".to_string(),
            Stage::Filtered => "showing the filtered data".to_string(),
            Stage::Searched(term) => {
                format!("Showing the searched records based on {term}")
            }
            Stage::DateRange(from, to) => {
                format!("Showing the data based on date range {from} to {to}")
            }
        }
    }
}

/// A validated listing plan: every axis resolved, nothing queried yet.
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub page: i64,
    pub sort: SortKey,
    pub filters: Vec<(FilterDomain, String)>,
    pub search: Option<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub stage: Stage,
    pub strategy: MergeStrategy,
}

/// The predicates a repository should actually apply, after the entity's
/// merge strategy has been resolved against the triggered stages.
#[derive(Debug, Clone)]
pub struct Effective {
    pub sort: SortKey,
    pub filters: Vec<(FilterDomain, String)>,
    pub search: Option<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Effective {
    fn base(sort: SortKey) -> Self {
        Effective {
            sort,
            filters: Vec::new(),
            search: None,
            date_range: None,
        }
    }
}

impl ListingConfig {
    /// Validate a raw request into a [`ListPlan`].
    ///
    /// Fails fast (before any query) on a bad page number, an unrecognized
    /// sort key, an unrecognized filter token, or a half-open date range.
    pub fn plan(&self, req: &ListRequest) -> Result<ListPlan, CoreError> {
        paging::validate_page(req.page)?;

        let sort = match req.sort_by.as_deref() {
            Some(raw) => Some(SortKey::parse(raw, self.allowed_sorts)?),
            None => None,
        };

        let mut filters = Vec::with_capacity(req.filters.len());
        for token in &req.filters {
            let domain = self
                .domains
                .iter()
                .copied()
                .find(|d| d.contains(token))
                .ok_or_else(|| {
                    CoreError::Validation("Please enter a valid filter value".to_string())
                })?;
            filters.push((domain, token.clone()));
        }

        let search = req
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let date_range = match (req.from_date, req.to_date) {
            (Some(from), Some(to)) => {
                if from > to {
                    return Err(CoreError::Validation(
                        "fromDate must not be after toDate".to_string(),
                    ));
                }
                Some((from, to))
            }
            (None, None) => None,
            _ => {
                return Err(CoreError::Validation(
                    "Both fromDate and toDate are required for a date range".to_string(),
                ))
            }
        };

        let mut stage = Stage::Initial;
        if sort.is_some() {
            stage = Stage::Sorted;
        }
        if !filters.is_empty() {
            stage = Stage::Filtered;
        }
        if let Some(term) = &search {
            stage = Stage::Searched(term.clone());
        }
        if let Some((from, to)) = date_range {
            stage = Stage::DateRange(from, to);
        }

        Ok(ListPlan {
            page: req.page,
            sort: sort.unwrap_or(SortKey::Newest),
            filters,
            search,
            date_range,
            stage,
            strategy: self.strategy,
        })
    }
}

impl ListPlan {
    pub fn message(&self) -> String {
        self.stage.message()
    }

    /// Resolve the merge strategy into the predicates that actually run.
    ///
    /// Under `Cumulative` every triggered axis applies. Under `ReplaceLast`
    /// only the last triggered stage's own predicate applies, with the
    /// default (newest-first) ordering for every stage except `Sorted`.
    pub fn effective(&self) -> Effective {
        match self.strategy {
            MergeStrategy::Cumulative => Effective {
                sort: self.sort,
                filters: self.filters.clone(),
                search: self.search.clone(),
                date_range: self.date_range,
            },
            MergeStrategy::ReplaceLast => match &self.stage {
                Stage::Initial => Effective::base(SortKey::Newest),
                Stage::Sorted => Effective::base(self.sort),
                Stage::Filtered => Effective {
                    filters: self.filters.clone(),
                    ..Effective::base(SortKey::Newest)
                },
                Stage::Searched(term) => Effective {
                    search: Some(term.clone()),
                    ..Effective::base(SortKey::Newest)
                },
                Stage::DateRange(from, to) => Effective {
                    date_range: Some((*from, *to)),
                    ..Effective::base(SortKey::Newest)
                },
            },
        }
    }
}

/// Validate a request-body value against a closed categorical domain.
///
/// Used by the mutation handlers so a bad type/breed/grade/session token
/// fails before any row is touched.
pub fn ensure_domain(domain: &[&str], value: &str, label: &str) -> Result<(), CoreError> {
    if domain.contains(&value) {
        return Ok(());
    }
    Err(CoreError::Validation(format!(
        "Please enter a valid {label} value"
    )))
}

// ---------------------------------------------------------------------------
// Per-row enrichment
// ---------------------------------------------------------------------------

/// The rolling average-milk figure attached to each row of the cattle
/// listing, from the per-session averages of that animal's milk records.
///
/// The arithmetic is the reference system's, preserved verbatim: only the
/// evening term is divided by 3. Do not "correct" this to a three-way mean
/// without a conformance-profile decision (see DESIGN.md).
pub fn cattle_average_milk(avg_morning: f64, avg_afternoon: f64, avg_evening: f64) -> f64 {
    (avg_morning + avg_afternoon) + (avg_evening / 3.0)
}
