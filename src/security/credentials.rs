//! Credential verification seam.
//!
//! The guard never compares credentials itself; it asks a `CredentialVerifier`
//! and only consumes the boolean result.

use crate::config::CredentialsConfig;

/// Decides whether a username/password pair is valid.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn verify(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// Accepts exactly one configured username/password pair.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&CredentialsConfig> for StaticCredentials {
    fn from(config: &CredentialsConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        constant_time_eq(username.as_bytes(), self.username.as_bytes())
            & constant_time_eq(password.as_bytes(), self.password.as_bytes())
    }
}

// Compares every byte so timing does not reveal the matching prefix length.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::from(&CredentialsConfig::default());
        assert!(creds.verify("admin", "pw"));
        assert!(!creds.verify("admin", "wrong"));
        assert!(!creds.verify("root", "pw"));
        assert!(!creds.verify("", ""));
        assert!(!creds.verify("admin", "pw "));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = StaticCredentials::new("admin", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_closure_verifier() {
        let verifier = |user: &str, _: &str| user == "ok";
        assert!(verifier.verify("ok", "anything"));
        assert!(!verifier.verify("nope", "anything"));
    }
}
