//! Analytics aggregator.
//!
//! Produces daily time-bucketed rollups - user growth, bookings, revenue -
//! over a symbolic range, computed in-process from facade listings so the
//! numbers are identical whichever backend answered. Empty ranges yield
//! zero-filled series, never errors.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use halcyon_core::Role;

use crate::models::marketplace::{MarketplaceItem, MarketplaceRequest};
use crate::models::user::User;
use crate::notify::ClientRegistry;
use crate::store::backend::Filter;
use crate::store::{Store, StoreError};

/// Payload fields probed for a monetary amount, in precedence order.
/// The first present, numeric-parseable field wins; if none qualifies the
/// item contributes zero.
pub const AMOUNT_FIELDS: [&str; 4] = ["price", "amount", "total", "cost"];

/// Reporting window, resolved from its symbolic form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Last 90 days.
    Quarter,
    /// Last 365 days.
    Year,
}

impl ReportRange {
    /// Parse a symbolic range. Anything unrecognized falls back to `7d`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "30d" => Self::Month,
            "90d" => Self::Quarter,
            "1y" => Self::Year,
            _ => Self::Week,
        }
    }

    /// Number of day buckets in the window.
    #[must_use]
    pub const fn days(self) -> u64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }
}

/// One day bucket of the cumulative user-growth series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Bucket date (YYYY-MM-DD).
    pub date: String,
    /// Total registered users through this day.
    pub users: usize,
}

/// One day bucket of the bookings series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPoint {
    /// Bucket date (YYYY-MM-DD).
    pub date: String,
    /// Requests created on this day.
    pub bookings: usize,
}

/// Revenue summed for one offer kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSlice {
    /// Display label ("Private Session" for kind `private_session`).
    pub name: String,
    /// Unitless raw sum.
    pub value: f64,
}

/// Scalar metrics alongside the series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    /// All users ever registered.
    pub total_users: usize,
    /// Currently connected member sessions (from the client registry).
    pub active_sessions: usize,
    /// All requests ever submitted, range-independent.
    pub total_bookings: usize,
    /// Month-to-date revenue: first of the current month through the end
    /// of the window, regardless of the requested range.
    #[serde(rename = "revenueMTD")]
    pub revenue_mtd: f64,
}

/// The full analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub user_growth: Vec<GrowthPoint>,
    pub bookings: Vec<BookingPoint>,
    pub revenue_breakdown: Vec<RevenueSlice>,
    pub metrics: ReportMetrics,
}

/// Analytics service over the facade and the presence registry.
pub struct AnalyticsService {
    store: Store,
    registry: Arc<dyn ClientRegistry>,
}

impl AnalyticsService {
    /// Create a new analytics service.
    pub fn new(store: Store, registry: Arc<dyn ClientRegistry>) -> Self {
        Self { store, registry }
    }

    /// Compute the report for a window ending today.
    ///
    /// # Errors
    ///
    /// Returns a store error if any of the underlying listings fail.
    #[instrument(skip(self))]
    pub async fn compute(&self, range: ReportRange) -> Result<AnalyticsReport, StoreError> {
        self.compute_as_of(range, Utc::now().date_naive()).await
    }

    /// Compute the report with a fixed end day. Reporting tests pin the
    /// clock through this entry point.
    ///
    /// # Errors
    ///
    /// Returns a store error if any of the underlying listings fail.
    pub async fn compute_as_of(
        &self,
        range: ReportRange,
        today: NaiveDate,
    ) -> Result<AnalyticsReport, StoreError> {
        let days = range.days();
        let start = today
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(today);

        let users = self.store.users().list(Filter::new()).await?;
        let requests = self.store.requests().list(Filter::new()).await?;
        let items = self.store.items().list(Filter::new()).await?;

        // Every calendar day in [start, today] appears exactly once,
        // zero-filled when nothing happened.
        let buckets: Vec<NaiveDate> = start.iter_days().take(usize::try_from(days).unwrap_or(7)).collect();

        let user_growth = user_growth_series(&buckets, start, &users);
        let bookings = bookings_series(&buckets, &requests);
        let revenue_breakdown = revenue_breakdown(&items, start, today);

        let month_start = today.with_day(1).unwrap_or(today);
        let revenue_mtd = revenue_total(&items, month_start, today);

        let metrics = ReportMetrics {
            total_users: users.len(),
            active_sessions: self.registry.active_sessions(Role::User),
            total_bookings: requests.len(),
            revenue_mtd,
        };

        Ok(AnalyticsReport {
            user_growth,
            bookings,
            revenue_breakdown,
            metrics,
        })
    }
}

/// Cumulative registrations per bucket: users created strictly before the
/// window form the baseline, then each day adds its registrations. The
/// series is non-decreasing by construction.
fn user_growth_series(buckets: &[NaiveDate], start: NaiveDate, users: &[User]) -> Vec<GrowthPoint> {
    let baseline = users
        .iter()
        .filter(|user| user.created_at.date_naive() < start)
        .count();

    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for user in users {
        let day = user.created_at.date_naive();
        if day >= start {
            *per_day.entry(day).or_default() += 1;
        }
    }

    let mut running = baseline;
    buckets
        .iter()
        .map(|day| {
            running += per_day.get(day).copied().unwrap_or(0);
            GrowthPoint {
                date: format_date(*day),
                users: running,
            }
        })
        .collect()
}

/// Per-day (non-cumulative) request creations inside the window.
fn bookings_series(buckets: &[NaiveDate], requests: &[MarketplaceRequest]) -> Vec<BookingPoint> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for request in requests {
        *per_day.entry(request.created_at.date_naive()).or_default() += 1;
    }

    buckets
        .iter()
        .map(|day| BookingPoint {
            date: format_date(*day),
            bookings: per_day.get(day).copied().unwrap_or(0),
        })
        .collect()
}

/// Revenue per offer kind for items materialized inside the window.
/// Item creation time is its approval time.
fn revenue_breakdown(items: &[MarketplaceItem], start: NaiveDate, end: NaiveDate) -> Vec<RevenueSlice> {
    let mut by_kind: BTreeMap<String, f64> = BTreeMap::new();
    for item in items {
        let day = item.created_at.date_naive();
        if day >= start && day <= end {
            *by_kind.entry(item.kind.clone()).or_default() += payload_amount(&item.data);
        }
    }

    by_kind
        .into_iter()
        .map(|(kind, value)| RevenueSlice {
            name: display_kind(&kind),
            value,
        })
        .collect()
}

/// Total revenue for items materialized inside `[start, end]`.
fn revenue_total(items: &[MarketplaceItem], start: NaiveDate, end: NaiveDate) -> f64 {
    items
        .iter()
        .filter(|item| {
            let day = item.created_at.date_naive();
            day >= start && day <= end
        })
        .map(|item| payload_amount(&item.data))
        .sum()
}

/// Extract the monetary amount from an offer payload.
///
/// Pure function over the documented precedence list
/// `price -> amount -> total -> cost`: the first field that is present
/// and numeric (or a numeric-parseable string) wins; payloads with no
/// qualifying field yield `0`. Amounts are unitless - no currency
/// conversion or rounding.
#[must_use]
pub fn payload_amount(data: &Value) -> f64 {
    for field in AMOUNT_FIELDS {
        match data.get(field) {
            Some(Value::Number(n)) => {
                if let Some(value) = n.as_f64() {
                    return value;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(value) = s.trim().parse::<f64>() {
                    return value;
                }
            }
            Some(_) | None => {}
        }
    }
    0.0
}

/// Title-case a kind label, rendering underscores as spaces:
/// `private_session` -> `Private Session`.
fn display_kind(kind: &str) -> String {
    kind.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_parse_defaults_to_week() {
        assert_eq!(ReportRange::parse("7d"), ReportRange::Week);
        assert_eq!(ReportRange::parse("30d"), ReportRange::Month);
        assert_eq!(ReportRange::parse("90d"), ReportRange::Quarter);
        assert_eq!(ReportRange::parse("1y"), ReportRange::Year);
        assert_eq!(ReportRange::parse("all-time"), ReportRange::Week);
        assert_eq!(ReportRange::parse(""), ReportRange::Week);
    }

    #[test]
    fn test_payload_amount_precedence() {
        assert!((payload_amount(&json!({"price": 5, "amount": 10})) - 5.0).abs() < f64::EPSILON);
        assert!((payload_amount(&json!({"amount": "7.5"})) - 7.5).abs() < f64::EPSILON);
        assert!((payload_amount(&json!({})) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_payload_amount_skips_unparseable_fields() {
        // "price" is present but not numeric-parseable, so "amount" wins.
        assert!((payload_amount(&json!({"price": "sliding scale", "amount": 40})) - 40.0).abs()
            < f64::EPSILON);
        assert!((payload_amount(&json!({"total": true, "cost": "12"})) - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_kind_title_cases() {
        assert_eq!(display_kind("retreat"), "Retreat");
        assert_eq!(display_kind("private_session"), "Private Session");
        assert_eq!(display_kind("sound_bath_kit"), "Sound Bath Kit");
    }

    #[test]
    fn test_bucket_sequence_is_complete_and_ascending() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        for range in [
            ReportRange::Week,
            ReportRange::Month,
            ReportRange::Quarter,
            ReportRange::Year,
        ] {
            let days = range.days();
            let start = today.checked_sub_days(Days::new(days - 1)).unwrap();
            let buckets: Vec<NaiveDate> =
                start.iter_days().take(usize::try_from(days).unwrap()).collect();

            assert_eq!(buckets.len() as u64, days);
            assert_eq!(buckets.first().copied(), Some(start));
            assert_eq!(buckets.last().copied(), Some(today));
            assert!(buckets.windows(2).all(|pair| pair[1] == pair[0].succ_opt().unwrap()));
        }
    }

    #[test]
    fn test_growth_series_is_non_decreasing() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let start = today.checked_sub_days(Days::new(6)).unwrap();
        let buckets: Vec<NaiveDate> = start.iter_days().take(7).collect();

        let users: Vec<User> = [start, start, today]
            .iter()
            .map(|day| {
                let at = day.and_hms_opt(9, 30, 0).unwrap().and_utc();
                let mut user = sample_user();
                user.created_at = at;
                user.updated_at = at;
                user
            })
            .collect();

        let series = user_growth_series(&buckets, start, &users);
        assert!(series.windows(2).all(|pair| pair[0].users <= pair[1].users));
        assert_eq!(series.last().unwrap().users, 3);
    }

    fn sample_user() -> User {
        use crate::models::user::NewUser;
        User::from_new(
            NewUser {
                id: None,
                name: "Sample".to_string(),
                email: format!("{}@example.com", uuid::Uuid::new_v4()),
                role: None,
                profile: None,
            },
            "hash".to_string(),
        )
        .unwrap()
    }
}
