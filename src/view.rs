// 🧭 View State & Reducer
// One explicit ViewState, mutated only through Actions. Everything the
// front end shows is derived from (config, state, now) by `Dashboard::derive`.

use crate::compensation::Period;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::notification::{NotificationDraft, NotificationEvent, NotificationSink};
use crate::range::{filter_by_range, TimeRange};
use crate::summary::{Breakdown, QuickStats, TaxSummary};
use crate::tax::after_tax;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

// ============================================================================
// STATE & ACTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub range: TimeRange,
    pub after_tax: bool,
    pub region: String,
    pub draft: NotificationDraft,
    pub notifications_enabled: bool,
}

impl ViewState {
    /// Session start: 1Y, pre-tax, empty draft, notifications on
    pub fn new(region: impl Into<String>) -> Self {
        ViewState {
            range: TimeRange::OneYear,
            after_tax: false,
            region: region.into(),
            draft: NotificationDraft::default(),
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetRange(TimeRange),
    ToggleAfterTax,
    SelectRegion(String),
    EditEmail(String),
    EditThreshold(String),
    SubmitNotification,
    ToggleNotifications,
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ViewState,
    pub event: Option<NotificationEvent>,
}

// ============================================================================
// DERIVED VIEW
// ============================================================================

/// One chart point. `total` follows the after-tax toggle; base and equity
/// are always pre-tax.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub total: f64,
    pub base: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub company_name: String,
    pub range: TimeRange,
    pub after_tax: bool,
    pub region: String,
    pub regions: Vec<String>,
    /// Empty when no record falls in the window
    pub series: Vec<SeriesPoint>,
    /// `None` only for an empty dataset
    pub breakdown: Option<Breakdown>,
    pub tax: Option<TaxSummary>,
    pub effective_rate: f64,
    pub draft: NotificationDraft,
    pub notifications_enabled: bool,
    pub quick_stats: QuickStats,
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard {
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Dashboard { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn initial_state(&self) -> ViewState {
        ViewState::new(self.config.default_region.clone())
    }

    /// Apply one action. Rejected actions leave the caller's state untouched.
    pub fn reduce(&self, state: &ViewState, action: Action) -> DashboardResult<Transition> {
        let mut next = state.clone();
        let mut event = None;

        match action {
            Action::SetRange(range) => next.range = range,
            Action::ToggleAfterTax => next.after_tax = !next.after_tax,
            Action::SelectRegion(region) => {
                if !self.config.tax_table.contains(&region) {
                    return Err(DashboardError::InvalidRegion(region));
                }
                next.region = region;
            }
            Action::EditEmail(email) => next.draft.email = email,
            Action::EditThreshold(threshold) => next.draft.threshold = threshold,
            Action::SubmitNotification => {
                event = Some(next.draft.submit(&next.region)?);
                next.draft = NotificationDraft::default();
            }
            Action::ToggleNotifications => {
                next.notifications_enabled = !next.notifications_enabled;
                event = Some(NotificationEvent::Toggled {
                    enabled: next.notifications_enabled,
                });
            }
        }

        debug!(
            range = %next.range,
            after_tax = next.after_tax,
            region = %next.region,
            notifications_enabled = next.notifications_enabled,
            "view state updated"
        );

        Ok(Transition { state: next, event })
    }

    /// Reduce in place and hand any resulting event to `sink`
    pub fn dispatch(
        &self,
        state: &mut ViewState,
        action: Action,
        sink: &mut dyn NotificationSink,
    ) -> DashboardResult<Option<NotificationEvent>> {
        let transition = self.reduce(state, action)?;
        *state = transition.state;

        if let Some(event) = &transition.event {
            sink.deliver(event);
        }

        Ok(transition.event)
    }

    /// Breakdown of the latest record under the current toggle and region
    pub fn breakdown(&self, state: &ViewState) -> DashboardResult<Breakdown> {
        let rate = self.config.tax_table.rate(&state.region)?;
        let latest = self.config.dataset.latest().ok_or(DashboardError::EmptyDataset)?;
        Ok(Breakdown::for_record(latest, state.after_tax, rate))
    }

    /// Everything the front end renders. `now` is captured once by the caller.
    pub fn derive(&self, state: &ViewState, now: NaiveDate) -> DashboardResult<DashboardView> {
        let rate = self.config.tax_table.rate(&state.region)?;
        let dataset = &self.config.dataset;

        let series = filter_by_range(dataset.records(), state.range, now)
            .into_iter()
            .map(|record| SeriesPoint {
                period: record.period,
                total: if state.after_tax {
                    after_tax(record.total_comp, rate)
                } else {
                    record.total_comp
                },
                base: record.base_salary,
                equity: record.equity,
            })
            .collect();

        let latest = dataset.latest();

        Ok(DashboardView {
            company_name: self.config.company_name.clone(),
            range: state.range,
            after_tax: state.after_tax,
            region: state.region.clone(),
            regions: self
                .config
                .tax_table
                .regions()
                .into_iter()
                .map(String::from)
                .collect(),
            series,
            breakdown: latest.map(|r| Breakdown::for_record(r, state.after_tax, rate)),
            tax: latest.map(|r| TaxSummary::for_record(r, rate)),
            effective_rate: rate,
            draft: state.draft.clone(),
            notifications_enabled: state.notifications_enabled,
            quick_stats: QuickStats::new(dataset, &self.config.quick_stats),
        })
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::{CompensationRecord, Dataset};
    use crate::format::format_rate;
    use crate::notification::{NotificationSignup, RecordingSink};
    use crate::tax::{TaxRate, TaxTable};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn apply(dashboard: &Dashboard, state: ViewState, actions: Vec<Action>) -> ViewState {
        actions.into_iter().fold(state, |s, action| {
            dashboard.reduce(&s, action).unwrap().state
        })
    }

    #[test]
    fn test_initial_state() {
        let dashboard = Dashboard::default();
        let state = dashboard.initial_state();

        assert_eq!(state.range, TimeRange::OneYear);
        assert!(!state.after_tax);
        assert_eq!(state.region, "California");
        assert_eq!(state.draft, NotificationDraft::default());
        assert!(state.notifications_enabled);
    }

    #[test]
    fn test_one_year_california_pre_tax() {
        let dashboard = Dashboard::default();
        let view = dashboard
            .derive(&dashboard.initial_state(), date(2024, 4, 15))
            .unwrap();

        assert_eq!(view.series.len(), 6);

        let breakdown = view.breakdown.unwrap();
        assert_eq!(breakdown.base, 125_000.0);
        assert_eq!(breakdown.equity, 85_000.0);
        assert_eq!(breakdown.bonus, 10_000.0);
        assert_eq!(breakdown.total, 220_000.0);
        assert_eq!(format_rate(view.effective_rate), "30.0%");
        assert_eq!(view.quick_stats.yoy_growth_percent, Some(22.2));
    }

    #[test]
    fn test_texas_after_tax_uses_selected_rate() {
        let dashboard = Dashboard::default();
        let state = apply(
            &dashboard,
            dashboard.initial_state(),
            vec![Action::ToggleAfterTax, Action::SelectRegion("Texas".to_string())],
        );

        let view = dashboard.derive(&state, date(2024, 4, 15)).unwrap();
        let breakdown = view.breakdown.unwrap();

        assert_eq!(breakdown.base, 93_750.0);
        assert_eq!(breakdown.equity, 63_750.0);
        assert_eq!(breakdown.bonus, 7_500.0);
        assert_eq!(breakdown.total, 165_000.0);

        let tax = view.tax.unwrap();
        assert_eq!(tax.tax_amount, 55_000.0);
        assert_eq!(tax.take_home, 165_000.0);

        // Chart total follows the toggle, components stay pre-tax
        let last = view.series.last().unwrap();
        assert_eq!(last.total, 165_000.0);
        assert_eq!(last.base, 125_000.0);
        assert_eq!(last.equity, 85_000.0);
    }

    #[test]
    fn test_pre_tax_total_equals_component_sum() {
        let dashboard = Dashboard::default();
        let state = dashboard.initial_state();

        let breakdown = dashboard.breakdown(&state).unwrap();
        let latest = dashboard.config().dataset.latest().unwrap();

        assert_eq!(
            breakdown.total,
            latest.base_salary + latest.equity + latest.bonus
        );
    }

    #[test]
    fn test_empty_window_keeps_breakdown() {
        let dashboard = Dashboard::default();
        let state = apply(
            &dashboard,
            dashboard.initial_state(),
            vec![Action::SetRange(TimeRange::OneMonth)],
        );

        let view = dashboard.derive(&state, date(2024, 6, 1)).unwrap();

        assert!(view.series.is_empty());
        let breakdown = view.breakdown.unwrap();
        assert_eq!(breakdown.period.to_string(), "2024-03");
        assert_eq!(breakdown.total, 220_000.0);
    }

    #[test]
    fn test_submit_notification_emits_once_and_resets() {
        let dashboard = Dashboard::default();
        let mut state = dashboard.initial_state();
        let mut sink = RecordingSink::default();

        for action in [
            Action::SelectRegion("Florida".to_string()),
            Action::EditEmail("a@b.com".to_string()),
            Action::EditThreshold("10".to_string()),
            Action::SubmitNotification,
        ] {
            dashboard.dispatch(&mut state, action, &mut sink).unwrap();
        }

        assert_eq!(sink.events.len(), 1);
        match &sink.events[0] {
            NotificationEvent::SignedUp(NotificationSignup {
                email,
                threshold_percent,
                region,
                ..
            }) => {
                assert_eq!(email, "a@b.com");
                assert_eq!(*threshold_percent, 10);
                assert_eq!(region, "Florida");
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert_eq!(state.draft.email, "");
        assert_eq!(state.draft.threshold_percent().unwrap(), 5);
    }

    #[test]
    fn test_invalid_submission_keeps_state() {
        let dashboard = Dashboard::default();
        let mut state = apply(
            &dashboard,
            dashboard.initial_state(),
            vec![
                Action::EditEmail("a@b.com".to_string()),
                Action::EditThreshold("0".to_string()),
            ],
        );
        let before = state.clone();
        let mut sink = RecordingSink::default();

        let err = dashboard
            .dispatch(&mut state, Action::SubmitNotification, &mut sink)
            .unwrap_err();

        assert_eq!(err, DashboardError::InvalidThreshold("0".to_string()));
        assert_eq!(state, before);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_toggle_notifications_only_flips_flag() {
        let dashboard = Dashboard::default();
        let state = dashboard.initial_state();

        let transition = dashboard.reduce(&state, Action::ToggleNotifications).unwrap();

        assert!(!transition.state.notifications_enabled);
        assert_eq!(
            transition.event,
            Some(NotificationEvent::Toggled { enabled: false })
        );

        let now = date(2024, 4, 15);
        let before = dashboard.derive(&state, now).unwrap();
        let after = dashboard.derive(&transition.state, now).unwrap();
        assert_eq!(before.series, after.series);
        assert_eq!(before.breakdown, after.breakdown);
        assert_eq!(before.tax, after.tax);
    }

    #[test]
    fn test_unknown_region_rejected() {
        let dashboard = Dashboard::default();
        let state = dashboard.initial_state();

        let err = dashboard
            .reduce(&state, Action::SelectRegion("Oregon".to_string()))
            .unwrap_err();
        assert_eq!(err, DashboardError::InvalidRegion("Oregon".to_string()));

        let mut stale = state.clone();
        stale.region = "Oregon".to_string();
        assert!(dashboard.derive(&stale, date(2024, 4, 15)).is_err());
    }

    #[test]
    fn test_synthetic_config_injection() {
        let dataset = Dataset::new(vec![CompensationRecord::new(
            "2025-01".parse().unwrap(),
            80_000.0,
            15_000.0,
            5_000.0,
            90_000.0,
        )])
        .unwrap();
        let table = TaxTable::new(vec![TaxRate::new("Nowhere", 0.5)]).unwrap();
        let config = DashboardConfig::new("Acme", dataset, table, "Nowhere").unwrap();
        let dashboard = Dashboard::new(config);

        let mut state = dashboard.initial_state();
        state.after_tax = true;

        let view = dashboard.derive(&state, date(2025, 1, 20)).unwrap();

        assert_eq!(view.company_name, "Acme");
        assert_eq!(view.regions, vec!["Nowhere".to_string()]);
        assert_eq!(view.breakdown.unwrap().total, 50_000.0);
        assert_eq!(view.series.len(), 1);
    }

    #[test]
    fn test_empty_dataset_renders_empty_state() {
        let config = DashboardConfig::new(
            "Acme",
            Dataset::default(),
            TaxTable::builtin(),
            "Texas",
        )
        .unwrap();
        let dashboard = Dashboard::new(config);
        let state = dashboard.initial_state();

        let view = dashboard.derive(&state, date(2024, 4, 15)).unwrap();
        assert!(view.series.is_empty());
        assert!(view.breakdown.is_none());
        assert!(view.tax.is_none());

        assert_eq!(
            dashboard.breakdown(&state),
            Err(DashboardError::EmptyDataset)
        );
    }

    #[test]
    fn test_range_changes_only_series() {
        let dashboard = Dashboard::default();
        let now = date(2024, 3, 20);
        let mut state = dashboard.initial_state();

        let mut lengths = Vec::new();
        for range in TimeRange::ALL_RANGES {
            state = dashboard.reduce(&state, Action::SetRange(range)).unwrap().state;
            let view = dashboard.derive(&state, now).unwrap();
            assert_eq!(view.breakdown.unwrap().total, 220_000.0);
            lengths.push(view.series.len());
        }

        assert_eq!(lengths, vec![1, 3, 6, 6, 6]);
    }
}
