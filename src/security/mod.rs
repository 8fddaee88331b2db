//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login:
//!     → login_guard.rs (banned? short-circuit with retry-after)
//!     → credentials.rs (external username/password check)
//!     → login_guard.rs (record outcome)
//!     → attempt_tracker.rs (per-key counters and bans)
//!
//! Background:
//!     eviction.rs (sweep entries with no state left)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a banned caller never reaches the credential check
//! - The tracker is an explicit instance shared by `Arc`, never a global
//! - No I/O or awaiting inside the tracker; every call is a short memory update

pub mod attempt_tracker;
pub mod credentials;
pub mod eviction;
pub mod login_guard;

pub use attempt_tracker::{AttemptTracker, FailureOutcome, LimiterSettings, TrackerStats};
pub use credentials::{CredentialVerifier, StaticCredentials};
pub use eviction::EvictionTask;
pub use login_guard::{Admission, CredentialOutcome, LoginDecision, LoginGuard};
