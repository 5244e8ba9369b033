//! Wire types for the emissions service API

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::format;

/// Server-assigned user identifier; the only durable credential material.
pub type UserId = i64;

/// Top categories shown on the dashboard are capped at this many entries.
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Sign-up request payload, forwarded verbatim to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    /// Display name of the new account
    pub name: String,

    /// Email address used to sign in
    pub email: String,

    /// Plaintext password; hashed server-side
    pub password: String,
}

/// Sign-in request payload, forwarded verbatim to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    /// Email address of the account
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Response to a successful sign-up or sign-in.
///
/// The id is the value written into the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Server-assigned user id
    pub user_id: UserId,
}

/// Profile of the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user id
    pub user_id: UserId,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,
}

/// A recorded emission activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Server-assigned activity id
    pub id: i64,

    /// Facility the activity occurred at
    pub facility_id: i64,

    /// When the activity occurred
    pub occurred_at: DateTime<Utc>,

    /// Emission category (raw label, e.g. "fuel_combustion")
    pub category: String,

    /// Measurement unit of `value_numeric`
    pub unit: Option<String>,

    /// Measured quantity
    pub value_numeric: Option<f64>,

    /// Free-form description
    pub description: Option<String>,

    /// Caller-supplied idempotency/source identifier
    pub source_id: Option<String>,
}

/// Request body for recording a new activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    /// Facility the activity occurred at
    pub facility_id: i64,

    /// When the activity occurred
    pub occurred_at: DateTime<Utc>,

    /// Emission category (raw label)
    pub category: String,

    /// Measurement unit of `value_numeric`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Measured quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_numeric: Option<f64>,

    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Caller-supplied idempotency/source identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

/// Query parameters for listing activities. Absent fields are omitted from
/// the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityQuery {
    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub page_size: Option<u32>,

    /// Restrict to one facility
    pub facility_id: Option<i64>,

    /// Restrict to one raw category label
    pub category: Option<String>,
}

/// Per-scope KPI totals for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpisResponse {
    /// Grand total across all scopes, in kg CO₂e
    pub total_co2e_kg: f64,

    /// Scope 1 (direct) emissions, in kg CO₂e
    pub scope1_kg: f64,

    /// Scope 2 (indirect energy) emissions, in kg CO₂e
    pub scope2_kg: f64,

    /// Scope 3 (other indirect) emissions, in kg CO₂e
    pub scope3_kg: f64,
}

/// One point of the emissions trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Period label (ISO date at daily granularity)
    pub period: String,

    /// Emissions for the period, in kg CO₂e
    pub co2e_kg: f64,
}

/// Global (not date-scoped) emissions summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// All-time grand total, in kg CO₂e
    pub total_co2e_kg: f64,

    /// Number of facilities with recorded activity
    pub facilities_count: u64,

    /// Timestamp of the most recent recorded activity
    pub last_event_at: Option<DateTime<Utc>>,

    /// `[raw label, kg CO₂e]` pairs of the highest-emitting categories
    pub top_categories: Vec<(String, f64)>,
}

/// Inclusive date range for analytics reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range
    pub from: NaiveDate,

    /// Last day of the range
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The trailing 30 days ending today; the default when the caller
    /// supplies no range.
    pub fn trailing_30_days() -> Self {
        let to = Utc::now().date_naive();
        let from = to - Days::new(30);
        Self { from, to }
    }
}

/// A top-emitting category, display-ready.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    /// Normalized label (separators replaced, upper-cased)
    pub label: String,

    /// Emissions for the category, in kg CO₂e
    pub co2e_kg: f64,

    /// Formatted value ("950.4kg" / "1.5t")
    pub display_value: String,
}

/// One scope's slice of the KPI breakdown, display-ready.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSlice {
    /// Scope name ("Scope 1" / "Scope 2" / "Scope 3")
    pub name: &'static str,

    /// Emissions for the scope, in kg CO₂e
    pub co2e_kg: f64,

    /// Formatted value ("950.4kg" / "1.5t")
    pub display_value: String,
}

/// One consistent snapshot of the three dashboard payloads.
///
/// All fields come from the same fetch cycle; payloads from different cycles
/// are never mixed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    /// Per-scope totals for the requested range
    pub kpis: KpisResponse,

    /// Trend series, ordered by period ascending
    pub trend: Vec<TrendPoint>,

    /// Global summary
    pub summary: SummaryResponse,

    /// Top categories, ordered by value descending and capped at
    /// `TOP_CATEGORY_LIMIT`, display-ready
    pub top_categories: Vec<CategoryBreakdown>,
}

impl AnalyticsSnapshot {
    /// Combine the three decoded payloads into one snapshot.
    ///
    /// Orders the trend by period ascending, orders categories by value
    /// descending truncated to `TOP_CATEGORY_LIMIT`, and derives the
    /// display-ready label and value for each category.
    pub fn assemble(
        kpis: KpisResponse,
        mut trend: Vec<TrendPoint>,
        summary: SummaryResponse,
    ) -> Self {
        trend.sort_by(|a, b| a.period.cmp(&b.period));

        let mut top_categories: Vec<CategoryBreakdown> = summary
            .top_categories
            .iter()
            .map(|(raw, value)| CategoryBreakdown {
                label: format::normalize_category_label(raw),
                co2e_kg: *value,
                display_value: format::format_co2(*value),
            })
            .collect();
        top_categories.sort_by(|a, b| b.co2e_kg.total_cmp(&a.co2e_kg));
        top_categories.truncate(TOP_CATEGORY_LIMIT);

        Self {
            kpis,
            trend,
            summary,
            top_categories,
        }
    }

    /// Per-scope slices with non-zero emissions, display-ready.
    pub fn scope_breakdown(&self) -> Vec<ScopeSlice> {
        [
            ("Scope 1", self.kpis.scope1_kg),
            ("Scope 2", self.kpis.scope2_kg),
            ("Scope 3", self.kpis.scope3_kg),
        ]
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(name, value)| ScopeSlice {
            name,
            co2e_kg: value,
            display_value: format::format_co2(value),
        })
        .collect()
    }
}
