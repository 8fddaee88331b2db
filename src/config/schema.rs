//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the login guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the login guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Failed-login throttling thresholds.
    pub limiter: LimiterConfig,

    /// Where the login endpoint sends callers after a decision.
    pub login: LoginConfig,

    /// Static credentials checked by the bundled verifier.
    pub credentials: CredentialsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Failed-login throttling configuration.
///
/// The three thresholds are hot-reloadable; `eviction_interval_secs` is read
/// once at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimiterConfig {
    /// Failures inside one window before the caller is banned.
    pub max_attempts: u32,

    /// Length of the counting window in seconds, measured from the first failure.
    pub window_secs: u64,

    /// Ban length in seconds.
    pub ban_duration_secs: u64,

    /// How often stale entries are swept, in seconds (0 disables sweeping).
    pub eviction_interval_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_secs: 10 * 60,
            ban_duration_secs: 15 * 60,
            eviction_interval_secs: 60,
        }
    }
}

/// Login endpoint redirect targets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoginConfig {
    /// Redirect target after invalid credentials.
    pub failure_redirect: String,

    /// Redirect target after a successful login.
    pub success_redirect: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            failure_redirect: "/login?error=1".to_string(),
            success_redirect: "/welcome".to_string(),
        }
    }
}

/// Credentials accepted by the static verifier.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "pw".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder admin key shipped in defaults; rejected when the admin API is on.
pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}
