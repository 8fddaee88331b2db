//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, durations bounded)
//! - Check addresses parse before anything binds them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, including on reload

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GuardConfig, ADMIN_KEY_PLACEHOLDER};

/// Upper bound for the window and ban duration (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("limiter.max_attempts must be greater than 0")]
    ZeroMaxAttempts,

    #[error("{field} must be between 1 and {max} seconds, got {value}", max = MAX_DURATION_SECS)]
    DurationOutOfRange { field: &'static str, value: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be an absolute path starting with '/', got {value:?}")]
    InvalidRedirect { field: &'static str, value: String },

    #[error("credentials.username and credentials.password must not be empty")]
    EmptyCredentials,

    #[error("admin.api_key must be set to a non-placeholder value when the admin API is enabled")]
    WeakAdminKey,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limiter.max_attempts == 0 {
        errors.push(ValidationError::ZeroMaxAttempts);
    }
    check_duration(&mut errors, "limiter.window_secs", config.limiter.window_secs);
    check_duration(&mut errors, "limiter.ban_duration_secs", config.limiter.ban_duration_secs);
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::DurationOutOfRange {
            field: "listener.request_timeout_secs",
            value: 0,
        });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_redirect(&mut errors, "login.failure_redirect", &config.login.failure_redirect);
    check_redirect(&mut errors, "login.success_redirect", &config.login.success_redirect);

    if config.credentials.username.is_empty() || config.credentials.password.is_empty() {
        errors.push(ValidationError::EmptyCredentials);
    }

    if config.admin.enabled
        && (config.admin.api_key.trim().is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER)
    {
        errors.push(ValidationError::WeakAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duration(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 || value > MAX_DURATION_SECS {
        errors.push(ValidationError::DurationOutOfRange { field, value });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_redirect(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    // "//host" would be a protocol-relative redirect off-site.
    if !value.starts_with('/') || value.starts_with("//") {
        errors.push(ValidationError::InvalidRedirect {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&GuardConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = GuardConfig::default();
        config.limiter.max_attempts = 0;
        config.limiter.window_secs = 0;
        config.listener.bind_address = "not-an-address".into();
        config.login.success_redirect = "https://evil.example".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroMaxAttempts));
        assert!(errors.contains(&ValidationError::DurationOutOfRange {
            field: "limiter.window_secs",
            value: 0,
        }));
    }

    #[test]
    fn test_ban_duration_upper_bound() {
        let mut config = GuardConfig::default();
        config.limiter.ban_duration_secs = MAX_DURATION_SECS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DurationOutOfRange {
                field: "limiter.ban_duration_secs",
                value: MAX_DURATION_SECS + 1,
            }]
        );
    }

    #[test]
    fn test_protocol_relative_redirect_rejected() {
        let mut config = GuardConfig::default();
        config.login.failure_redirect = "//evil.example/login".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_admin_requires_real_key() {
        let mut config = GuardConfig::default();
        config.admin.enabled = true;
        assert_eq!(validate_config(&config), Err(vec![ValidationError::WeakAdminKey]));

        config.admin.api_key = "s3cret".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GuardConfig::default();
        config.observability.metrics_address = "nope".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
