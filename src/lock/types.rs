// Submission lock types

use std::sync::Mutex;
use std::time::Duration;

/// A submit-type control owned by the rendering layer
///
/// The lock only needs to flip the control's enabled flag and swap its
/// visible label; everything else about the control stays with its owner.
pub trait SubmitControl: Send + Sync {
    fn disable(&self);
    fn enable(&self);
    fn is_enabled(&self) -> bool;
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
}

/// Submission lock configuration
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Label shown while the submission is in flight
    pub busy_label: String,
    /// Safety window after which a still-held lock force-releases
    pub safety_release: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            busy_label: "Processing...".to_string(),
            safety_release: Duration::from_secs(5),
        }
    }
}

/// In-memory control, used by tests and the demo binary
pub struct TextControl {
    state: Mutex<ControlState>,
}

#[derive(Debug)]
struct ControlState {
    label: String,
    enabled: bool,
}

impl TextControl {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ControlState {
                label: label.into(),
                enabled: true,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SubmitControl for TextControl {
    fn disable(&self) {
        self.state().enabled = false;
    }

    fn enable(&self) {
        self.state().enabled = true;
    }

    fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    fn label(&self) -> String {
        self.state().label.clone()
    }

    fn set_label(&self, label: &str) {
        self.state().label = label.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_control_starts_enabled() {
        let control = TextControl::new("Submit");
        assert!(control.is_enabled());
        assert_eq!(control.label(), "Submit");
    }

    #[test]
    fn test_text_control_label_swap() {
        let control = TextControl::new("Upload Certificates");
        control.set_label("Processing...");
        control.disable();
        assert!(!control.is_enabled());
        assert_eq!(control.label(), "Processing...");
    }

    #[test]
    fn test_default_lock_config() {
        let config = LockConfig::default();
        assert_eq!(config.safety_release, Duration::from_secs(5));
        assert_eq!(config.busy_label, "Processing...");
    }
}
