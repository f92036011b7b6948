// ⚠️ Dashboard Errors
// Every rejected user action or malformed input maps to one variant here.
// File and CLI boundaries wrap these in anyhow with context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("unknown region `{0}`")]
    InvalidRegion(String),

    #[error("notification threshold must be a whole number between 1 and 100 (got `{0}`)")]
    InvalidThreshold(String),

    #[error("invalid notification email `{0}`")]
    InvalidEmail(String),

    #[error("unknown time range `{0}` (expected 1M, 3M, 6M, 1Y or ALL)")]
    InvalidRange(String),

    #[error("invalid period `{0}` (expected YYYY-MM)")]
    InvalidPeriod(String),

    #[error("tax rate for `{region}` must be within [0, 1] (got {rate})")]
    InvalidTaxRate { region: String, rate: f64 },

    #[error("region `{0}` appears more than once in the tax table")]
    DuplicateRegion(String),

    #[error("dataset periods must be strictly ascending (`{previous}` followed by `{next}`)")]
    UnorderedDataset { previous: String, next: String },

    #[error("dataset has no compensation records")]
    EmptyDataset,
}

pub type DashboardResult<T> = Result<T, DashboardError>;
