//! Series-alignment core for the dashboard charts.
//!
//! Every chart on the dashboard is built the same way: group records
//! by calendar day into sparse maps, take the sorted union of all
//! dates as the shared X axis, then align each series to that axis
//! substituting zero for absent days. This module holds that one
//! routine plus the time-period enumeration; the query side lives in
//! [`super::dashboard`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Reporting time window for chart queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    All,
    Last7Days,
    Last30Days,
    Last90Days,
    Last6Months,
    LastYear,
}

impl TimePeriod {
    /// Map a wire value to a period.
    ///
    /// Unrecognized values fall back to `All` (no lower bound) rather
    /// than failing, so the dashboard survives stale or hand-edited
    /// query strings.
    pub fn parse(value: &str) -> Self {
        match value {
            "7days" => Self::Last7Days,
            "30days" => Self::Last30Days,
            "90days" => Self::Last90Days,
            "6months" => Self::Last6Months,
            "1year" => Self::LastYear,
            _ => Self::All,
        }
    }

    /// Resolve an optional query parameter, using `default` when the
    /// parameter is absent entirely.
    pub fn from_param(param: Option<&str>, default: Self) -> Self {
        param.map(Self::parse).unwrap_or(default)
    }

    /// Minimum `created_at` for a record to fall inside the window.
    ///
    /// `All` applies no bound at all — not a beginning-of-time
    /// sentinel, literally no filter.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::All => return None,
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
            Self::Last6Months => 180,
            Self::LastYear => 365,
        };
        Some(now - Duration::days(days))
    }
}

/// Sparse per-day values for one series.
pub type DateSeries<V> = BTreeMap<NaiveDate, V>;

/// Sorted, deduplicated union of every date across the given series.
pub fn shared_axis<'a, V: 'a>(
    series: impl IntoIterator<Item = &'a DateSeries<V>>,
) -> Vec<NaiveDate> {
    let mut dates = BTreeSet::new();
    for s in series {
        dates.extend(s.keys().copied());
    }
    dates.into_iter().collect()
}

/// Align a sparse series to the shared axis.
///
/// Days present in the axis but absent from the series become the
/// value type's zero. No carry-forward of earlier values.
pub fn zero_fill<V: Copy + Default>(axis: &[NaiveDate], series: &DateSeries<V>) -> Vec<V> {
    axis.iter()
        .map(|day| series.get(day).copied().unwrap_or_default())
        .collect()
}

/// Render the axis as `YYYY-MM-DD` strings for the chart payload.
pub fn format_axis(axis: &[NaiveDate]) -> Vec<String> {
    axis.iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parse_known_periods() {
        assert_eq!(TimePeriod::parse("all"), TimePeriod::All);
        assert_eq!(TimePeriod::parse("7days"), TimePeriod::Last7Days);
        assert_eq!(TimePeriod::parse("30days"), TimePeriod::Last30Days);
        assert_eq!(TimePeriod::parse("90days"), TimePeriod::Last90Days);
        assert_eq!(TimePeriod::parse("6months"), TimePeriod::Last6Months);
        assert_eq!(TimePeriod::parse("1year"), TimePeriod::LastYear);
    }

    #[test]
    fn unrecognized_period_behaves_like_all() {
        assert_eq!(TimePeriod::parse("fortnight"), TimePeriod::All);
        assert_eq!(TimePeriod::parse(""), TimePeriod::All);
        assert_eq!(TimePeriod::parse("7DAYS"), TimePeriod::All);
    }

    #[test]
    fn from_param_defaults_differ_per_call_site() {
        // The main chart defaults to All, the purchase chart to 30 days.
        assert_eq!(
            TimePeriod::from_param(None, TimePeriod::All),
            TimePeriod::All
        );
        assert_eq!(
            TimePeriod::from_param(None, TimePeriod::Last30Days),
            TimePeriod::Last30Days
        );
        assert_eq!(
            TimePeriod::from_param(Some("1year"), TimePeriod::Last30Days),
            TimePeriod::LastYear
        );
    }

    #[test]
    fn cutoff_subtracts_days() {
        let now = DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(TimePeriod::All.cutoff(now), None);
        assert_eq!(
            TimePeriod::Last7Days.cutoff(now),
            Some(now - Duration::days(7))
        );
        assert_eq!(
            TimePeriod::Last6Months.cutoff(now),
            Some(now - Duration::days(180))
        );
        assert_eq!(
            TimePeriod::LastYear.cutoff(now),
            Some(now - Duration::days(365))
        );
    }

    #[test]
    fn shared_axis_is_sorted_union() {
        let mut a: DateSeries<i64> = BTreeMap::new();
        a.insert(day("2024-01-03"), 1);
        a.insert(day("2024-01-01"), 2);
        let mut b: DateSeries<i64> = BTreeMap::new();
        b.insert(day("2024-01-02"), 5);
        b.insert(day("2024-01-03"), 7);

        let axis = shared_axis([&a, &b]);
        assert_eq!(
            axis,
            vec![day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]
        );
    }

    #[test]
    fn zero_fill_aligns_every_series_to_axis_length() {
        let mut leads: DateSeries<i64> = BTreeMap::new();
        leads.insert(day("2024-01-01"), 1);
        leads.insert(day("2024-01-03"), 1);
        let mut clients: DateSeries<i64> = BTreeMap::new();
        clients.insert(day("2024-01-02"), 1);
        let mut won: DateSeries<i64> = BTreeMap::new();
        won.insert(day("2024-01-03"), 1);

        let axis = shared_axis([&leads, &clients, &won]);
        assert_eq!(zero_fill(&axis, &leads), vec![1, 0, 1]);
        assert_eq!(zero_fill(&axis, &clients), vec![0, 1, 0]);
        assert_eq!(zero_fill(&axis, &won), vec![0, 0, 1]);
        assert_eq!(
            format_axis(&axis),
            vec!["2024-01-01", "2024-01-02", "2024-01-03"]
        );
    }

    #[test]
    fn empty_series_produce_empty_axis_not_zeros() {
        let a: DateSeries<i64> = BTreeMap::new();
        let b: DateSeries<i64> = BTreeMap::new();
        let axis = shared_axis([&a, &b]);
        assert!(axis.is_empty());
        assert!(zero_fill::<i64>(&axis, &a).is_empty());
        assert!(format_axis(&axis).is_empty());
    }

    #[test]
    fn zero_fill_works_for_decimal_amounts() {
        let mut amounts: DateSeries<Decimal> = BTreeMap::new();
        amounts.insert(day("2024-02-01"), dec!(30.00));
        let mut other: DateSeries<Decimal> = BTreeMap::new();
        other.insert(day("2024-02-02"), dec!(12.50));

        let axis = shared_axis([&amounts, &other]);
        assert_eq!(
            zero_fill(&axis, &amounts),
            vec![dec!(30.00), Decimal::ZERO]
        );
    }
}
