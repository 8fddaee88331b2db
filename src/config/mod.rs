//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the server over a channel
//!     → limiter thresholds swapped atomically in the tracker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes arrive as whole new configs
//! - All fields have defaults to allow minimal configs
//! - Only the limiter thresholds are hot-swapped; other sections need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CredentialsConfig, GuardConfig, LimiterConfig, ListenerConfig, LoginConfig,
    ObservabilityConfig,
};
