//! Login challenge guard.
//!
//! # Responsibilities
//! - Refuse banned callers before their credentials are looked at
//! - Feed the credential outcome back into the attempt tracker
//! - Tell throttled rejections apart from plain invalid credentials
//!
//! # Data Flow
//! ```text
//! attempt(key, credentials)
//!     → admit: banned?  ──yes──▶ Blocked { retry_after }
//!     → verifier.verify
//!     → report:
//!         invalid → record_failure → banned now? → BanTriggered / InvalidCredentials
//!         valid   → record_success → Authenticated
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::observability::metrics;
use crate::security::attempt_tracker::{AttemptTracker, FailureOutcome};
use crate::security::credentials::CredentialVerifier;

/// Whether a caller may present credentials at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Blocked { retry_after: Duration },
}

/// Result of the external credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOutcome {
    Valid,
    Invalid,
}

impl From<bool> for CredentialOutcome {
    fn from(valid: bool) -> Self {
        if valid {
            CredentialOutcome::Valid
        } else {
            CredentialOutcome::Invalid
        }
    }
}

/// Final answer for one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// Credentials accepted; the session layer takes over.
    Authenticated,
    /// Credentials rejected, caller not banned.
    InvalidCredentials,
    /// This failure started a ban.
    BanTriggered { retry_after: Duration },
    /// Caller was already banned; credentials were not evaluated.
    Blocked { retry_after: Duration },
}

impl LoginDecision {
    /// Remaining ban time for throttled decisions.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LoginDecision::BanTriggered { retry_after } | LoginDecision::Blocked { retry_after } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }

    pub fn is_throttled(&self) -> bool {
        self.retry_after().is_some()
    }

    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginDecision::Authenticated => "authenticated",
            LoginDecision::InvalidCredentials => "invalid",
            LoginDecision::BanTriggered { .. } => "ban_triggered",
            LoginDecision::Blocked { .. } => "blocked",
        }
    }
}

/// Sits in the credential challenge path in front of an `AttemptTracker`.
#[derive(Debug, Clone)]
pub struct LoginGuard {
    tracker: Arc<AttemptTracker>,
}

impl LoginGuard {
    pub fn new(tracker: Arc<AttemptTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Arc<AttemptTracker> {
        &self.tracker
    }

    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Check the ban before any credential work happens.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        if self.tracker.is_banned_at(key, now) {
            Admission::Blocked {
                retry_after: self.tracker.remaining_ban_duration_at(key, now),
            }
        } else {
            Admission::Allowed
        }
    }

    pub fn report(&self, key: &str, outcome: CredentialOutcome) -> LoginDecision {
        self.report_at(key, outcome, Instant::now())
    }

    /// Record the credential outcome for an admitted caller.
    pub fn report_at(&self, key: &str, outcome: CredentialOutcome, now: Instant) -> LoginDecision {
        let decision = match outcome {
            CredentialOutcome::Valid => {
                self.tracker.record_success(key);
                LoginDecision::Authenticated
            }
            CredentialOutcome::Invalid => {
                if let FailureOutcome::Banned { .. } = self.tracker.record_failure_at(key, now) {
                    metrics::record_ban();
                }
                if self.tracker.is_banned_at(key, now) {
                    LoginDecision::BanTriggered {
                        retry_after: self.tracker.remaining_ban_duration_at(key, now),
                    }
                } else {
                    LoginDecision::InvalidCredentials
                }
            }
        };
        metrics::record_login_attempt(decision.as_str());
        decision
    }

    /// Run the full challenge: admission, credential check, outcome.
    ///
    /// The failure is timestamped after the verifier returns, so a slow
    /// credential check does not shorten the resulting ban.
    pub fn attempt<V>(&self, key: &str, verifier: &V, username: &str, password: &str) -> LoginDecision
    where
        V: CredentialVerifier + ?Sized,
    {
        if let Admission::Blocked { retry_after } = self.admit(key) {
            let decision = LoginDecision::Blocked { retry_after };
            metrics::record_login_attempt(decision.as_str());
            return decision;
        }

        let outcome = CredentialOutcome::from(verifier.verify(username, password));
        self.report(key, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::attempt_tracker::LimiterSettings;
    use crate::security::credentials::StaticCredentials;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const IP: &str = "1.2.3.4";

    fn guard() -> LoginGuard {
        LoginGuard::new(Arc::new(AttemptTracker::default()))
    }

    #[test]
    fn test_unknown_caller_is_admitted() {
        assert_eq!(guard().admit(IP), Admission::Allowed);
    }

    #[test]
    fn test_soft_then_hard_rejection() {
        let guard = guard();
        let t0 = Instant::now();

        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Invalid, t0),
            LoginDecision::InvalidCredentials
        );
        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Invalid, t0),
            LoginDecision::InvalidCredentials
        );
        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Invalid, t0),
            LoginDecision::BanTriggered {
                retry_after: Duration::from_secs(900)
            }
        );
        assert_eq!(
            guard.admit_at(IP, t0 + Duration::from_secs(60)),
            Admission::Blocked {
                retry_after: Duration::from_secs(840)
            }
        );
    }

    #[test]
    fn test_success_resets_streak() {
        let guard = guard();
        let t0 = Instant::now();
        guard.report_at(IP, CredentialOutcome::Invalid, t0);
        guard.report_at(IP, CredentialOutcome::Invalid, t0);
        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Valid, t0),
            LoginDecision::Authenticated
        );

        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Invalid, t0),
            LoginDecision::InvalidCredentials
        );
        assert_eq!(
            guard.report_at(IP, CredentialOutcome::Invalid, t0),
            LoginDecision::InvalidCredentials
        );
        assert!(guard.report_at(IP, CredentialOutcome::Invalid, t0).is_throttled());
    }

    #[test]
    fn test_banned_caller_credentials_not_evaluated() {
        let guard = LoginGuard::new(Arc::new(AttemptTracker::new(LimiterSettings {
            max_attempts: 1,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(60),
        })));
        let calls = AtomicUsize::new(0);
        let verifier = |_: &str, _: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        guard.report(IP, CredentialOutcome::Invalid);

        let decision = guard.attempt(IP, &verifier, "admin", "pw");
        assert!(matches!(decision, LoginDecision::Blocked { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_attempt_with_static_credentials() {
        let guard = guard();
        let creds = StaticCredentials::new("admin", "pw");

        assert_eq!(
            guard.attempt(IP, &creds, "admin", "nope"),
            LoginDecision::InvalidCredentials
        );
        assert_eq!(guard.attempt(IP, &creds, "admin", "pw"), LoginDecision::Authenticated);
        assert_eq!(guard.tracker().attempts_at(IP, Instant::now()), 0);
    }

    #[test]
    fn test_slow_verifier_does_not_shorten_ban() {
        let guard = LoginGuard::new(Arc::new(AttemptTracker::new(LimiterSettings {
            max_attempts: 1,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(10),
        })));
        let slow_reject = |_: &str, _: &str| {
            std::thread::sleep(Duration::from_millis(1500));
            false
        };

        let decision = guard.attempt(IP, &slow_reject, "admin", "nope");
        assert_eq!(
            decision,
            LoginDecision::BanTriggered {
                retry_after: Duration::from_secs(10)
            }
        );
        assert!(guard.tracker().remaining_ban_duration(IP) >= Duration::from_secs(9));
    }

    #[test]
    fn test_decision_helpers() {
        let retry_after = Duration::from_secs(5);
        assert_eq!(LoginDecision::Blocked { retry_after }.retry_after(), Some(retry_after));
        assert_eq!(LoginDecision::InvalidCredentials.retry_after(), None);
        assert!(!LoginDecision::Authenticated.is_throttled());
        assert_eq!(LoginDecision::BanTriggered { retry_after }.as_str(), "ban_triggered");
    }
}
