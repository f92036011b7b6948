// ⚙️ Dashboard Configuration
// Everything the dashboard needs is injected here: dataset, tax table,
// and the display-only values of the quick stats panel.

use crate::compensation::Dataset;
use crate::error::DashboardError;
use crate::tax::{TaxRate, TaxTable};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_COMPANY: &str = "TechCorp Inc.";
pub const DEFAULT_REGION: &str = "California";

/// Display-only figures for the quick stats panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickStatsConfig {
    /// Shown when the dataset cannot supply a year-over-year figure
    pub yoy_growth_percent: Option<f64>,
    pub stock_performance_percent: Option<f64>,
    pub next_vesting_date: Option<NaiveDate>,
}

impl Default for QuickStatsConfig {
    fn default() -> Self {
        QuickStatsConfig {
            yoy_growth_percent: Some(22.2),
            stock_performance_percent: Some(15.7),
            next_vesting_date: NaiveDate::from_ymd_opt(2024, 8, 15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub company_name: String,
    pub dataset: Dataset,
    pub tax_table: TaxTable,
    /// Region selected when a session starts
    pub default_region: String,
    pub quick_stats: QuickStatsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            company_name: DEFAULT_COMPANY.to_string(),
            dataset: Dataset::builtin(),
            tax_table: TaxTable::builtin(),
            default_region: DEFAULT_REGION.to_string(),
            quick_stats: QuickStatsConfig::default(),
        }
    }
}

/// On-disk JSON shape; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    company_name: String,
    dataset_csv: Option<PathBuf>,
    tax_rates: Vec<TaxRate>,
    default_region: String,
    yoy_growth_percent: Option<f64>,
    stock_performance_percent: Option<f64>,
    next_vesting_date: Option<NaiveDate>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let quick_stats = QuickStatsConfig::default();
        ConfigFile {
            company_name: DEFAULT_COMPANY.to_string(),
            dataset_csv: None,
            tax_rates: TaxTable::builtin().rates().to_vec(),
            default_region: DEFAULT_REGION.to_string(),
            yoy_growth_percent: quick_stats.yoy_growth_percent,
            stock_performance_percent: quick_stats.stock_performance_percent,
            next_vesting_date: quick_stats.next_vesting_date,
        }
    }
}

impl DashboardConfig {
    /// Assemble a config from explicit parts, checking the default region
    pub fn new(
        company_name: impl Into<String>,
        dataset: Dataset,
        tax_table: TaxTable,
        default_region: impl Into<String>,
    ) -> Result<Self, DashboardError> {
        let default_region = default_region.into();
        if !tax_table.contains(&default_region) {
            return Err(DashboardError::InvalidRegion(default_region));
        }

        Ok(DashboardConfig {
            company_name: company_name.into(),
            dataset,
            tax_table,
            default_region,
            quick_stats: QuickStatsConfig::default(),
        })
    }

    pub fn with_quick_stats(mut self, quick_stats: QuickStatsConfig) -> Self {
        self.quick_stats = quick_stats;
        self
    }

    /// Load a JSON config file. A relative `dataset_csv` is resolved
    /// against the config file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let file: ConfigFile =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        let dataset = match &file.dataset_csv {
            Some(csv_path) => {
                let resolved = if csv_path.is_relative() {
                    path.parent().unwrap_or_else(|| Path::new(".")).join(csv_path)
                } else {
                    csv_path.clone()
                };
                Dataset::from_csv(&resolved)?
            }
            None => Dataset::builtin(),
        };

        let tax_table = TaxTable::new(file.tax_rates).context("Invalid tax table")?;

        let config = DashboardConfig::new(file.company_name, dataset, tax_table, file.default_region)
            .context("Invalid default region")?
            .with_quick_stats(QuickStatsConfig {
                yoy_growth_percent: file.yoy_growth_percent,
                stock_performance_percent: file.stock_performance_percent,
                next_vesting_date: file.next_vesting_date,
            });

        info!(
            path = ?path,
            regions = config.tax_table.len(),
            records = config.dataset.len(),
            "loaded dashboard config"
        );

        Ok(config)
    }
}

// ============================================================================
// TESTS
// ============================================================================
