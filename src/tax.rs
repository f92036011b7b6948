// 🧾 Tax Table - Flat regional rates
// Region name → rate in [0, 1]. Order is preserved for the region selector.

use crate::error::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// PROJECTION
// ============================================================================

/// Reduce an amount by a flat rate: `amount × (1 − rate)`
pub fn after_tax(amount: f64, rate: f64) -> f64 {
    amount * (1.0 - rate)
}

// ============================================================================
// TAX RATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    pub region: String,
    pub rate: f64,
}

impl TaxRate {
    pub fn new(region: impl Into<String>, rate: f64) -> Self {
        TaxRate {
            region: region.into(),
            rate,
        }
    }
}

// ============================================================================
// TAX TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TaxTable {
    rates: Vec<TaxRate>,
}

impl TaxTable {
    /// Build a table, rejecting out-of-range rates and repeated regions
    pub fn new(rates: Vec<TaxRate>) -> DashboardResult<Self> {
        for (i, entry) in rates.iter().enumerate() {
            if !(0.0..=1.0).contains(&entry.rate) {
                return Err(DashboardError::InvalidTaxRate {
                    region: entry.region.clone(),
                    rate: entry.rate,
                });
            }

            if rates[..i].iter().any(|r| r.region == entry.region) {
                return Err(DashboardError::DuplicateRegion(entry.region.clone()));
            }
        }

        Ok(TaxTable { rates })
    }

    /// The five regions shipped with the dashboard
    pub fn builtin() -> Self {
        TaxTable {
            rates: vec![
                TaxRate::new("California", 0.30),
                TaxRate::new("Texas", 0.25),
                TaxRate::new("Florida", 0.20),
                TaxRate::new("NewYork", 0.35),
                TaxRate::new("Washington", 0.15),
            ],
        }
    }

    /// Rate for a region; unknown regions are an error, never a silent default
    pub fn rate(&self, region: &str) -> DashboardResult<f64> {
        self.rates
            .iter()
            .find(|r| r.region == region)
            .map(|r| r.rate)
            .ok_or_else(|| DashboardError::InvalidRegion(region.to_string()))
    }

    pub fn contains(&self, region: &str) -> bool {
        self.rates.iter().any(|r| r.region == region)
    }

    pub fn rates(&self) -> &[TaxRate] {
        &self.rates
    }

    /// Region keys in table order
    pub fn regions(&self) -> Vec<&str> {
        self.rates.iter().map(|r| r.region.as_str()).collect()
    }

    /// Region following `current`, wrapping around
    pub fn next_region(&self, current: &str) -> Option<&str> {
        let idx = self.rates.iter().position(|r| r.region == current)?;
        self.rates.get((idx + 1) % self.rates.len()).map(|r| r.region.as_str())
    }

    /// Region preceding `current`, wrapping around
    pub fn previous_region(&self, current: &str) -> Option<&str> {
        let idx = self.rates.iter().position(|r| r.region == current)?;
        let prev = if idx == 0 { self.rates.len() - 1 } else { idx - 1 };
        self.rates.get(prev).map(|r| r.region.as_str())
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
