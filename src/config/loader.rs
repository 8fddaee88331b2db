//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GuardConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GuardConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GuardConfig, ConfigError> {
    let config: GuardConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [limiter]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.limiter.max_attempts, 5);
        assert_eq!(config.limiter.window_secs, 600);
        assert_eq!(config.limiter.ban_duration_secs, 900);
        assert_eq!(config.login.failure_redirect, "/login?error=1");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), GuardConfig::default());
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = parse_config(include_str!("../../guard.toml")).unwrap();
        assert_eq!(sample, GuardConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[limiter\nmax_attempts = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_all_problems() {
        let err = parse_config(
            r#"
            [limiter]
            max_attempts = 0
            ban_duration_secs = 0
            "#,
        )
        .unwrap_err();

        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("max_attempts"));
        assert!(err.to_string().contains("ban_duration_secs"));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join("login_guard_loader_test.toml");
        std::fs::write(&path, "[credentials]\nusername = \"root\"\npassword = \"hunter2\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.credentials.username, "root");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here/guard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
