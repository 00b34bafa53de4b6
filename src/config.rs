use crate::guard::{AdminScope, GuardConfig};
use crate::lock::LockConfig;
use crate::validation::UploadPolicy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Top-level settings for the guard runtime
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub guard: GuardSettings,
    pub submit: SubmitSettings,
    pub upload: UploadPolicy,
    pub notices: NoticeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// Admin area path prefix; the guard only arms for pages under it
    pub admin_prefix: String,
    /// Session extension endpoint
    pub keep_alive_url: String,
    pub idle_threshold_secs: u64,
    pub warning_message: String,
}

impl Default for GuardSettings {
    fn default() -> Self {
        let defaults = GuardConfig::default();
        Self {
            admin_prefix: "/admin".to_string(),
            keep_alive_url: "http://127.0.0.1:5000/admin/keep-alive".to_string(),
            idle_threshold_secs: defaults.idle_threshold.as_secs(),
            warning_message: defaults.warning_message,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmitSettings {
    pub busy_label: String,
    pub safety_release_secs: u64,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        let defaults = LockConfig::default();
        Self {
            busy_label: defaults.busy_label,
            safety_release_secs: defaults.safety_release.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoticeSettings {
    pub dismiss_after_secs: u64,
}

impl Default for NoticeSettings {
    fn default() -> Self {
        Self {
            dismiss_after_secs: 4,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.guard.idle_threshold_secs == 0 {
            return Err("guard.idle_threshold_secs must be greater than zero".to_string());
        }
        if self.guard.keep_alive_url.is_empty() {
            return Err("guard.keep_alive_url must not be empty".to_string());
        }
        if !self.guard.admin_prefix.starts_with('/') {
            return Err(format!(
                "guard.admin_prefix must start with '/', got '{}'",
                self.guard.admin_prefix
            ));
        }
        if self.submit.safety_release_secs == 0 {
            return Err("submit.safety_release_secs must be greater than zero".to_string());
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err("upload.allowed_extensions must name at least one extension".to_string());
        }
        if self.upload.max_bytes == 0 {
            return Err("upload.max_bytes must be greater than zero".to_string());
        }
        if self.notices.dismiss_after_secs == 0 {
            return Err("notices.dismiss_after_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            idle_threshold: Duration::from_secs(self.guard.idle_threshold_secs),
            warning_message: self.guard.warning_message.clone(),
        }
    }

    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            busy_label: self.submit.busy_label.clone(),
            safety_release: Duration::from_secs(self.submit.safety_release_secs),
        }
    }

    pub fn admin_scope(&self) -> AdminScope {
        AdminScope::new(self.guard.admin_prefix.clone())
    }

    pub fn notice_delay(&self) -> Duration {
        Duration::from_secs(self.notices.dismiss_after_secs)
    }
}

/// Load settings from a YAML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Arc<Settings>, String> {
    let path = path.as_ref();
    info!("Loading settings from: {}", path.display());

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings file '{}': {}", path.display(), e))?;

    let settings: Settings = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse YAML settings: {}", e))?;

    settings.validate()?;

    info!(
        "Settings loaded: admin prefix '{}', idle threshold {}s",
        settings.guard.admin_prefix, settings.guard.idle_threshold_secs
    );

    Ok(Arc::new(settings))
}

/// Load settings with fallback options
pub fn load_settings_with_fallback() -> Result<Arc<Settings>, String> {
    // Try loading from environment variable first
    if let Ok(config_path) = std::env::var("CONFIG_PATH") {
        match load_settings(&config_path) {
            Ok(settings) => return Ok(settings),
            Err(e) => warn!(
                "Failed to load settings from CONFIG_PATH ({}): {}",
                config_path, e
            ),
        }
    }

    // Try common settings file locations
    let paths = vec!["guard.yaml", "guard.yml"];

    for path in paths {
        if Path::new(path).exists() {
            match load_settings(path) {
                Ok(settings) => return Ok(settings),
                Err(e) => warn!("Failed to load settings from '{}': {}", path, e),
            }
        }
    }

    // Every setting has a sane default, so a missing file is not an error
    info!("No settings file found, using defaults");
    Ok(Arc::new(Settings::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let yaml = r#"
guard:
  admin_prefix: /panel
  keep_alive_url: https://certs.example.com/panel/keep-alive
  idle_threshold_secs: 600
  warning_message: "Still there?"
submit:
  busy_label: "Working..."
  safety_release_secs: 8
upload:
  allowed_extensions: [pdf]
  max_bytes: 1048576
notices:
  dismiss_after_secs: 2
"#;

        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.guard.admin_prefix, "/panel");
        assert_eq!(settings.guard.idle_threshold_secs, 600);
        assert_eq!(settings.submit.safety_release_secs, 8);
        assert_eq!(settings.upload.allowed_extensions, vec!["pdf"]);
        assert_eq!(settings.notices.dismiss_after_secs, 2);
    }

    #[test]
    fn test_partial_settings_fill_in_defaults() {
        let yaml = r#"
guard:
  idle_threshold_secs: 300
"#;

        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.guard.idle_threshold_secs, 300);
        assert_eq!(settings.guard.admin_prefix, "/admin");
        assert_eq!(settings.submit.safety_release_secs, 5);
        assert_eq!(settings.upload.max_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.guard.idle_threshold_secs, 1500);
    }

    #[test]
    fn test_validation_rejects_zero_threshold() {
        let mut settings = Settings::default();
        settings.guard.idle_threshold_secs = 0;
        let result = settings.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("idle_threshold_secs"));
    }

    #[test]
    fn test_validation_rejects_bad_prefix() {
        let mut settings = Settings::default();
        settings.guard.admin_prefix = "admin".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let settings = Settings::default();
        let guard = settings.guard_config();
        assert_eq!(guard.idle_threshold, Duration::from_secs(1500));
        let lock = settings.lock_config();
        assert_eq!(lock.safety_release, Duration::from_secs(5));
        assert!(settings.admin_scope().contains("/admin/upload"));
    }
}
