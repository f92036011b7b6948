// 🔔 Notifications - Draft form + side-effect events
// Submitting or toggling produces an explicit event; delivering it is the
// job of a NotificationSink (the seam to a real backend).

use crate::error::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_THRESHOLD_PERCENT: u8 = 5;
pub const MIN_THRESHOLD_PERCENT: u8 = 1;
pub const MAX_THRESHOLD_PERCENT: u8 = 100;

// ============================================================================
// DRAFT
// ============================================================================

/// Pending signup form. The threshold is kept as typed so that
/// non-numeric input can be rejected at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub email: String,
    pub threshold: String,
}

impl Default for NotificationDraft {
    fn default() -> Self {
        NotificationDraft {
            email: String::new(),
            threshold: DEFAULT_THRESHOLD_PERCENT.to_string(),
        }
    }
}

impl NotificationDraft {
    pub fn new(email: impl Into<String>, threshold_percent: u8) -> Self {
        NotificationDraft {
            email: email.into(),
            threshold: threshold_percent.to_string(),
        }
    }

    /// Parsed threshold, required to be within [1, 100]
    pub fn threshold_percent(&self) -> DashboardResult<u8> {
        let invalid = || DashboardError::InvalidThreshold(self.threshold.clone());
        let value: u8 = self.threshold.trim().parse().map_err(|_| invalid())?;

        if (MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&value) {
            Ok(value)
        } else {
            Err(invalid())
        }
    }

    /// Trimmed email with a non-empty local part and domain
    pub fn validated_email(&self) -> DashboardResult<String> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(email.to_string())
            }
            _ => Err(DashboardError::InvalidEmail(self.email.clone())),
        }
    }

    /// Validate the draft and build the signup event for `region`
    pub fn submit(&self, region: &str) -> DashboardResult<NotificationEvent> {
        let email = self.validated_email()?;
        let threshold_percent = self.threshold_percent()?;

        Ok(NotificationEvent::SignedUp(NotificationSignup {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            threshold_percent,
            region: region.to_string(),
        }))
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSignup {
    /// Unique per submission
    pub id: String,
    pub email: String,
    pub threshold_percent: u8,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    SignedUp(NotificationSignup),
    Toggled { enabled: bool },
}

impl NotificationEvent {
    /// Short human-readable description for status lines
    pub fn summary(&self) -> String {
        match self {
            NotificationEvent::SignedUp(signup) => format!(
                "Signed up {} for {}% changes ({})",
                signup.email, signup.threshold_percent, signup.region
            ),
            NotificationEvent::Toggled { enabled: true } => "Notifications enabled".to_string(),
            NotificationEvent::Toggled { enabled: false } => "Notifications disabled".to_string(),
        }
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Fire-and-forget delivery of notification events
pub trait NotificationSink {
    fn deliver(&mut self, event: &NotificationEvent);
}

/// Emits each event as a structured log record
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&mut self, event: &NotificationEvent) {
        match event {
            NotificationEvent::SignedUp(signup) => info!(
                id = %signup.id,
                email = %signup.email,
                threshold_percent = signup.threshold_percent,
                region = %signup.region,
                "signed up for notifications"
            ),
            NotificationEvent::Toggled { enabled } => {
                info!(enabled = *enabled, "notifications toggled")
            }
        }
    }
}

/// Keeps every delivered event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<NotificationEvent>,
}

impl NotificationSink for RecordingSink {
    fn deliver(&mut self, event: &NotificationEvent) {
        self.events.push(event.clone());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft() {
        let draft = NotificationDraft::default();

        assert_eq!(draft.email, "");
        assert_eq!(draft.threshold_percent().unwrap(), 5);
    }

    #[test]
    fn test_threshold_bounds() {
        let mut draft = NotificationDraft::new("a@b.com", 1);
        assert_eq!(draft.threshold_percent().unwrap(), 1);

        draft.threshold = "100".to_string();
        assert_eq!(draft.threshold_percent().unwrap(), 100);

        for bad in ["0", "101", "-3", "ten", "", "2.5"] {
            draft.threshold = bad.to_string();
            assert_eq!(
                draft.threshold_percent(),
                Err(DashboardError::InvalidThreshold(bad.to_string())),
                "threshold {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(NotificationDraft::new("a@b.com", 5).validated_email().is_ok());
        assert_eq!(
            NotificationDraft::new("  a@b.com ", 5).validated_email().unwrap(),
            "a@b.com"
        );

        for bad in ["", "ab.com", "@b.com", "a@", "a@b@c"] {
            assert!(
                NotificationDraft::new(bad, 5).validated_email().is_err(),
                "email {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_submit_builds_signup() {
        let event = NotificationDraft::new("a@b.com", 10).submit("Florida").unwrap();

        match event {
            NotificationEvent::SignedUp(signup) => {
                assert_eq!(signup.email, "a@b.com");
                assert_eq!(signup.threshold_percent, 10);
                assert_eq!(signup.region, "Florida");
                assert!(!signup.id.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_submit_rejects_out_of_range_threshold() {
        let mut draft = NotificationDraft::new("a@b.com", 10);
        draft.threshold = "500".to_string();

        assert!(matches!(
            draft.submit("Texas"),
            Err(DashboardError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::default();
        let event = NotificationEvent::Toggled { enabled: false };

        sink.deliver(&event);
        LogSink.deliver(&event);

        assert_eq!(sink.events, vec![event]);
    }

    #[test]
    fn test_event_summary() {
        assert_eq!(
            NotificationEvent::Toggled { enabled: true }.summary(),
            "Notifications enabled"
        );
    }
}
