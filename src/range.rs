// 📅 Time Range Filter
// Keeps the records whose period starts on or after `now - offset`.

use crate::compensation::CompensationRecord;
use crate::error::DashboardError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    /// Selector order
    pub const ALL_RANGES: [TimeRange; 5] = [
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
        TimeRange::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::OneYear => "1Y",
            TimeRange::All => "ALL",
        }
    }

    /// Look-back window in months; `None` means no filtering
    pub fn months(&self) -> Option<u32> {
        match self {
            TimeRange::OneMonth => Some(1),
            TimeRange::ThreeMonths => Some(3),
            TimeRange::SixMonths => Some(6),
            TimeRange::OneYear => Some(12),
            TimeRange::All => None,
        }
    }

    /// Earliest date still inside the window. Day-of-month clamps to the
    /// end of the target month (2024-03-31 minus 1M is 2024-02-29).
    pub fn cutoff(&self, now: NaiveDate) -> Option<NaiveDate> {
        let months = self.months()?;
        Some(now.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::OneYear
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL_RANGES
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidRange(s.to_string()))
    }
}

/// Records inside `range` relative to `now`, in their original order.
/// An empty result is a valid outcome.
pub fn filter_by_range(
    records: &[CompensationRecord],
    range: TimeRange,
    now: NaiveDate,
) -> Vec<CompensationRecord> {
    // Cutoff is computed once so every record is compared against the same instant
    match range.cutoff(now) {
        None => records.to_vec(),
        Some(cutoff) => records
            .iter()
            .filter(|r| r.period.start() >= cutoff)
            .cloned()
            .collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::Dataset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn periods(records: &[CompensationRecord]) -> Vec<String> {
        records.iter().map(|r| r.period.to_string()).collect()
    }

    #[test]
    fn test_labels_round_trip() {
        for range in TimeRange::ALL_RANGES {
            assert_eq!(range.label().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert_eq!(
            "2W".parse::<TimeRange>(),
            Err(DashboardError::InvalidRange("2W".to_string()))
        );
    }

    #[test]
    fn test_cutoff_clamps_to_month_end() {
        assert_eq!(TimeRange::OneMonth.cutoff(date(2024, 3, 31)), Some(date(2024, 2, 29)));
        assert_eq!(TimeRange::OneYear.cutoff(date(2024, 4, 15)), Some(date(2023, 4, 15)));
        assert_eq!(TimeRange::All.cutoff(date(2024, 4, 15)), None);

        // Clamped cutoff keeps the current month in the 1M window
        let dataset = Dataset::builtin();
        let filtered = filter_by_range(dataset.records(), TimeRange::OneMonth, date(2024, 3, 31));
        assert_eq!(periods(&filtered), vec!["2024-03"]);
    }

    #[test]
    fn test_one_year_includes_whole_builtin_dataset() {
        let dataset = Dataset::builtin();
        let filtered = filter_by_range(dataset.records(), TimeRange::OneYear, date(2024, 4, 15));

        assert_eq!(filtered.len(), 6);
    }

    #[test]
    fn test_short_ranges_keep_suffix() {
        let dataset = Dataset::builtin();
        let now = date(2024, 3, 20);

        assert_eq!(
            periods(&filter_by_range(dataset.records(), TimeRange::OneMonth, now)),
            vec!["2024-03"]
        );
        assert_eq!(
            periods(&filter_by_range(dataset.records(), TimeRange::ThreeMonths, now)),
            vec!["2024-01", "2024-02", "2024-03"]
        );
        assert_eq!(filter_by_range(dataset.records(), TimeRange::SixMonths, now).len(), 6);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let dataset = Dataset::builtin();
        let filtered = filter_by_range(dataset.records(), TimeRange::OneMonth, date(2024, 3, 1));

        assert_eq!(periods(&filtered), vec!["2024-02", "2024-03"]);
    }

    #[test]
    fn test_stale_now_gives_empty_series() {
        let dataset = Dataset::builtin();
        let filtered = filter_by_range(dataset.records(), TimeRange::OneMonth, date(2024, 6, 1));

        assert!(filtered.is_empty());
    }

    #[test]
    fn test_all_is_identity() {
        let dataset = Dataset::builtin();
        let filtered = filter_by_range(dataset.records(), TimeRange::All, date(2030, 1, 1));

        assert_eq!(filtered, dataset.records().to_vec());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let dataset = Dataset::builtin();

        for now in [date(2024, 1, 10), date(2024, 3, 31), date(2025, 2, 1)] {
            for range in TimeRange::ALL_RANGES {
                let once = filter_by_range(dataset.records(), range, now);
                let twice = filter_by_range(&once, range, now);
                assert_eq!(once, twice, "range {} at {}", range, now);
            }
        }
    }
}
