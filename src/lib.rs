// TC Tracker - Core Library
// Compensation dataset, tax lookups and the dashboard view model.
// Front ends (TUI, text report) live in the binary.

pub mod error;
pub mod compensation;   // Monthly records + CSV loading
pub mod tax;            // Regional flat rates + after-tax projection
pub mod range;          // Time-range filter
pub mod summary;        // Breakdown, tax info, quick stats
pub mod notification;   // Signup draft, events, sinks
pub mod config;
pub mod format;
pub mod view;           // ViewState, Actions, Dashboard reducer

// Re-export commonly used types
pub use error::{DashboardError, DashboardResult};
pub use compensation::{CompensationRecord, Dataset, Period};
pub use tax::{after_tax, TaxRate, TaxTable};
pub use range::{filter_by_range, TimeRange};
pub use summary::{yoy_growth_percent, Breakdown, QuickStats, TaxSummary};
pub use notification::{
    LogSink, NotificationDraft, NotificationEvent, NotificationSignup, NotificationSink,
    RecordingSink,
};
pub use config::{DashboardConfig, QuickStatsConfig};
pub use format::{format_change, format_currency, format_rate};
pub use view::{Action, Dashboard, DashboardView, SeriesPoint, Transition, ViewState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
