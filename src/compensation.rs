// 💰 Compensation Dataset
// Monthly compensation records, ordered by period, immutable once loaded.

use crate::error::{DashboardError, DashboardResult};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

// ============================================================================
// PERIOD
// ============================================================================

/// A calendar month (`YYYY-MM`). Its instant is the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> DashboardResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DashboardError::InvalidPeriod(format!("{}-{}", year, month)));
        }
        Ok(Period { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        // Validated in `new`, so the fallback is never taken
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The same month one year earlier
    pub fn year_before(&self) -> Period {
        Period {
            year: self.year - 1,
            month: self.month,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DashboardError::InvalidPeriod(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Period::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

// ============================================================================
// COMPENSATION RECORD
// ============================================================================

/// One month of compensation. `total_comp` is expected to equal
/// `base_salary + equity + bonus`; see [`Dataset::invariant_violations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationRecord {
    #[serde(rename = "Period")]
    pub period: Period,

    #[serde(rename = "Total_Comp")]
    pub total_comp: f64,

    #[serde(rename = "Base_Salary")]
    pub base_salary: f64,

    #[serde(rename = "Equity")]
    pub equity: f64,

    #[serde(rename = "Bonus")]
    pub bonus: f64,

    /// After-tax total as recorded at import time. Carried as data only:
    /// derived figures use the selected region's rate instead.
    #[serde(rename = "Total_Comp_After_Tax")]
    pub total_comp_after_tax: f64,
}

impl CompensationRecord {
    pub fn new(
        period: Period,
        base_salary: f64,
        equity: f64,
        bonus: f64,
        total_comp_after_tax: f64,
    ) -> Self {
        CompensationRecord {
            period,
            total_comp: base_salary + equity + bonus,
            base_salary,
            equity,
            bonus,
            total_comp_after_tax,
        }
    }

    /// Sum of the three components
    pub fn component_sum(&self) -> f64 {
        self.base_salary + self.equity + self.bonus
    }

    /// Whether `total_comp` matches the sum of its components (to the cent)
    pub fn is_consistent(&self) -> bool {
        (self.total_comp - self.component_sum()).abs() < 0.01
    }

    /// Flat rate that produced the stored after-tax total, if any
    pub fn implied_tax_rate(&self) -> Option<f64> {
        if self.total_comp > 0.0 {
            Some(1.0 - self.total_comp_after_tax / self.total_comp)
        } else {
            None
        }
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Ordered, immutable sequence of compensation records (ascending by period)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<CompensationRecord>,
}

impl Dataset {
    /// Build a dataset, rejecting out-of-order or repeated periods
    pub fn new(records: Vec<CompensationRecord>) -> DashboardResult<Self> {
        for pair in records.windows(2) {
            if pair[0].period >= pair[1].period {
                return Err(DashboardError::UnorderedDataset {
                    previous: pair[0].period.to_string(),
                    next: pair[1].period.to_string(),
                });
            }
        }

        Ok(Dataset { records })
    }

    /// The six months shipped with the dashboard (2023-10 through 2024-03)
    pub fn builtin() -> Self {
        let rows: [(i32, u32, f64, f64, f64, f64); 6] = [
            (2023, 10, 120_000.0, 65_000.0, 10_000.0, 136_500.0),
            (2023, 11, 120_000.0, 70_000.0, 10_000.0, 140_000.0),
            (2023, 12, 120_000.0, 75_000.0, 10_000.0, 143_500.0),
            (2024, 1, 125_000.0, 75_000.0, 10_000.0, 147_000.0),
            (2024, 2, 125_000.0, 80_000.0, 10_000.0, 150_500.0),
            (2024, 3, 125_000.0, 85_000.0, 10_000.0, 154_000.0),
        ];

        let records = rows
            .iter()
            .map(|&(year, month, base, equity, bonus, after_tax)| {
                CompensationRecord::new(Period { year, month }, base, equity, bonus, after_tax)
            })
            .collect();

        Dataset { records }
    }

    /// Load records from a CSV file with a `Period,Total_Comp,...` header
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open compensation CSV: {:?}", path))?;

        let mut records = Vec::new();
        for (line, result) in rdr.deserialize().enumerate() {
            let record: CompensationRecord = result
                .with_context(|| format!("Failed to parse compensation record on row {}", line + 1))?;
            records.push(record);
        }

        let dataset = Dataset::new(records)
            .with_context(|| format!("Invalid compensation dataset: {:?}", path))?;

        info!(path = ?path, records = dataset.len(), "loaded compensation dataset");
        dataset.warn_on_inconsistencies();

        Ok(dataset)
    }

    pub fn records(&self) -> &[CompensationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record (independent of any range filter)
    pub fn latest(&self) -> Option<&CompensationRecord> {
        self.records.last()
    }

    pub fn find(&self, period: Period) -> Option<&CompensationRecord> {
        self.records.iter().find(|r| r.period == period)
    }

    /// Periods whose total does not match base + equity + bonus
    pub fn invariant_violations(&self) -> Vec<Period> {
        self.records
            .iter()
            .filter(|r| !r.is_consistent())
            .map(|r| r.period)
            .collect()
    }

    /// Periods whose stored after-tax total implies a rate outside [0, 1]
    pub fn implausible_after_tax(&self) -> Vec<Period> {
        self.records
            .iter()
            .filter(|r| {
                r.implied_tax_rate()
                    .is_some_and(|rate| !(0.0..=1.0).contains(&rate))
            })
            .map(|r| r.period)
            .collect()
    }

    fn warn_on_inconsistencies(&self) {
        for record in self.records.iter().filter(|r| !r.is_consistent()) {
            warn!(
                period = %record.period,
                total_comp = record.total_comp,
                component_sum = record.component_sum(),
                "total comp does not equal base + equity + bonus"
            );
        }

        for period in self.implausible_after_tax() {
            if let Some(record) = self.find(period) {
                warn!(
                    period = %period,
                    total_comp_after_tax = record.total_comp_after_tax,
                    implied_rate = record.implied_tax_rate(),
                    "stored after-tax total implies a rate outside [0, 1]"
                );
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
