// 📊 Summary Panels
// Current-period breakdown, tax information and quick stats. All figures
// come from the latest record of the full dataset, never the filtered series.
//
// Single source of truth for after-tax amounts: the selected region's rate.
// The record's stored after-tax total is not used for display.

use crate::compensation::{CompensationRecord, Dataset, Period};
use crate::config::QuickStatsConfig;
use crate::tax::after_tax;
use chrono::NaiveDate;
use serde::Serialize;

// ============================================================================
// BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub period: Period,
    pub after_tax: bool,
    pub base: f64,
    pub equity: f64,
    pub bonus: f64,
    pub total: f64,
}

impl Breakdown {
    /// Raw or tax-projected figures for one record
    pub fn for_record(record: &CompensationRecord, show_after_tax: bool, rate: f64) -> Self {
        let project = |amount: f64| {
            if show_after_tax {
                after_tax(amount, rate)
            } else {
                amount
            }
        };

        Breakdown {
            period: record.period,
            after_tax: show_after_tax,
            base: project(record.base_salary),
            equity: project(record.equity),
            bonus: project(record.bonus),
            total: project(record.total_comp),
        }
    }
}

// ============================================================================
// TAX SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    pub rate: f64,
    pub tax_amount: f64,
    pub take_home: f64,
}

impl TaxSummary {
    pub fn for_record(record: &CompensationRecord, rate: f64) -> Self {
        let take_home = after_tax(record.total_comp, rate);
        TaxSummary {
            rate,
            tax_amount: record.total_comp - take_home,
            take_home,
        }
    }
}

// ============================================================================
// QUICK STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStats {
    /// Latest total vs. the record twelve months earlier, in percent,
    /// falling back to the configured figure
    pub yoy_growth_percent: Option<f64>,
    pub stock_performance_percent: Option<f64>,
    pub next_vesting_date: Option<NaiveDate>,
}

impl QuickStats {
    pub fn new(dataset: &Dataset, config: &QuickStatsConfig) -> Self {
        QuickStats {
            yoy_growth_percent: yoy_growth_percent(dataset).or(config.yoy_growth_percent),
            stock_performance_percent: config.stock_performance_percent,
            next_vesting_date: config.next_vesting_date,
        }
    }
}

/// Growth of total comp over the year ending at the latest record.
/// `None` when the dataset lacks the record from a year earlier.
pub fn yoy_growth_percent(dataset: &Dataset) -> Option<f64> {
    let latest = dataset.latest()?;
    let year_ago = dataset.find(latest.period.year_before())?;

    if year_ago.total_comp <= 0.0 {
        return None;
    }

    Some((latest.total_comp / year_ago.total_comp - 1.0) * 100.0)
}

// ============================================================================
// TESTS
// ============================================================================
