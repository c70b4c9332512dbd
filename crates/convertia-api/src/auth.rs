//! Credential verification seam.
//!
//! The lockout tracker and login endpoint only need a yes/no answer for a
//! username/password pair; where that answer comes from is deployment
//! specific. The trait keeps the boundary testable and lets the demo
//! binary run against env-configured credentials.

/// Answers whether a username/password pair is valid.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Rejects everything. Default when no credential source is configured,
/// so a misconfigured deployment fails closed.
pub struct DenyAll;

impl CredentialVerifier for DenyAll {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        false
    }
}

/// Single fixed credential pair, for demos and tests.
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

    /// Build from `DEMO_USERNAME` / `DEMO_PASSWORD` when both are set.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("DEMO_USERNAME").ok()?;
        let password = std::env::var("DEMO_PASSWORD").ok()?;
        Some(Self::new(username, password))
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_all_rejects() {
        assert!(!DenyAll.verify("alice", "password"));
    }

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new("alice", "s3cret");
        assert!(creds.verify("alice", "s3cret"));
        assert!(!creds.verify("alice", "wrong"));
        assert!(!creds.verify("bob", "s3cret"));
    }
}
