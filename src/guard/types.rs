// Guard types and state definitions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Session guard configuration
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Inactivity duration after which the expiry warning fires
    pub idle_threshold: Duration,
    /// Message handed to the warning prompt
    pub warning_message: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            // Warn 5 minutes before the server's 30 minute session lifetime runs out
            idle_threshold: Duration::from_secs(25 * 60),
            warning_message: "Your session is about to expire. Do you want to stay logged in?"
                .to_string(),
        }
    }
}

/// Guard state
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Deadline counting toward a warning
    Armed,
    /// Deadline reached, prompt shown, rescheduling paused until the user decides
    Warning,
    /// Warning dismissed; no deadline pending until the next activity event
    Disarmed,
}

/// Qualifying user-activity event kinds
///
/// Any of these is evidence the user is still present; all of them reset
/// the idle deadline identically.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Scroll,
    Click,
}

/// A single observed activity event
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn now(kind: ActivityKind) -> Self {
        Self {
            kind,
            at: Utc::now(),
        }
    }
}

/// Observable snapshot of a guard's lifecycle
#[derive(Debug, Clone, Serialize)]
pub struct GuardStatus {
    pub state: GuardState,
    pub last_activity_at: DateTime<Utc>,
    pub warnings_shown: u32,
    pub keep_alives_sent: u32,
}

impl GuardStatus {
    pub fn armed() -> Self {
        Self {
            state: GuardState::Armed,
            last_activity_at: Utc::now(),
            warnings_shown: 0,
            keep_alives_sent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.idle_threshold, Duration::from_secs(1500));
        assert!(!config.warning_message.is_empty());
    }

    #[test]
    fn test_initial_status_is_armed() {
        let status = GuardStatus::armed();
        assert_eq!(status.state, GuardState::Armed);
        assert_eq!(status.warnings_shown, 0);
        assert_eq!(status.keep_alives_sent, 0);
    }

    #[test]
    fn test_activity_event_records_kind() {
        let event = ActivityEvent::now(ActivityKind::Scroll);
        assert_eq!(event.kind, ActivityKind::Scroll);
    }
}
