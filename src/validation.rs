// Form and upload pre-checks
// Client-side courtesy checks only; the server re-validates everything

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").expect("email pattern is valid");
}

/// Whether the input is an acceptable Gmail address
///
/// Input is trimmed and lowercased first, matching how the server
/// normalizes addresses before lookup.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(&email.trim().to_lowercase())
}

/// Upload pre-check policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![
                "pdf".to_string(),
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
            ],
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

impl UploadPolicy {
    /// Check a candidate file before it is sent anywhere
    pub fn check(&self, filename: &str, size: u64) -> Result<(), String> {
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => {
                return Err(format!(
                    "{}: file must have an extension (e.g. .pdf, .png, .jpg)",
                    filename
                ))
            }
        };

        if !self.allowed_extensions.iter().any(|a| *a == extension) {
            return Err(format!(
                "{}: invalid file type. Allowed: {}",
                filename,
                self.allowed_extensions.join(", ")
            ));
        }

        if size > self.max_bytes {
            return Err(format!(
                "{}: file is too large ({}, limit {})",
                filename,
                format_size(size),
                format_size(self.max_bytes)
            ));
        }

        Ok(())
    }
}

/// Human-readable size, one decimal above bytes
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Error for one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Declarative per-form validation
///
/// Required fields must be non-blank; email fields are additionally checked
/// against the address pattern when non-empty.
#[derive(Debug, Default)]
pub struct FormCheck {
    required: Vec<String>,
    email_fields: Vec<String>,
}

impl FormCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    pub fn require_email(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.required.push(field.clone());
        self.email_fields.push(field);
        self
    }

    /// Run all checks, returning one error per failing field
    pub fn run(&self, values: &HashMap<String, String>) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for field in &self.required {
            let blank = values.get(field).map(|v| v.trim().is_empty()).unwrap_or(true);
            if blank {
                errors.push(FieldError {
                    field: field.clone(),
                    message: "Please enter a value".to_string(),
                });
            }
        }

        for field in &self.email_fields {
            if let Some(value) = values.get(field) {
                if !value.trim().is_empty() && !validate_email(value) {
                    errors.push(FieldError {
                        field: field.clone(),
                        message: "Please enter a valid Gmail address".to_string(),
                    });
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_gmail_addresses() {
        assert!(validate_email("someone@gmail.com"));
        assert!(validate_email("first.last+tag@gmail.com"));
        assert!(validate_email("  Mixed.Case@Gmail.COM  "));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!validate_email(""));
        assert!(!validate_email("someone@example.com"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("someone@gmail.com extra"));
    }

    #[test]
    fn test_upload_policy_accepts_allowed_file() {
        let policy = UploadPolicy::default();
        assert!(policy.check("report.pdf", 2 * 1024 * 1024).is_ok());
        assert!(policy.check("scan.JPEG", 1024).is_ok());
    }

    #[test]
    fn test_upload_policy_rejects_disallowed_extension() {
        let policy = UploadPolicy::default();
        let err = policy.check("payload.exe", 1024).unwrap_err();
        assert!(err.contains("invalid file type"));
    }

    #[test]
    fn test_upload_policy_rejects_missing_extension() {
        let policy = UploadPolicy::default();
        assert!(policy.check("README", 10).is_err());
        assert!(policy.check("archive.", 10).is_err());
    }

    #[test]
    fn test_upload_policy_rejects_oversized_file() {
        let policy = UploadPolicy::default();
        let err = policy.check("huge.pdf", 17 * 1024 * 1024).unwrap_err();
        assert!(err.contains("too large"));
        assert!(err.contains("17.0 MB"));
        assert!(err.contains("16.0 MB"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(16 * 1024 * 1024), "16.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_form_check_required_and_email() {
        let check = FormCheck::new().require_email("email").require("name");

        let mut values = HashMap::new();
        values.insert("email".to_string(), "nobody@example.com".to_string());

        let errors = check.run(&values);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors
            .iter()
            .any(|e| e.field == "email" && e.message.contains("Gmail")));

        values.insert("email".to_string(), "someone@gmail.com".to_string());
        values.insert("name".to_string(), "Someone".to_string());
        assert!(check.run(&values).is_empty());
    }
}
