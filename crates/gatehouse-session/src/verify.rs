//! Credential verification hook.
//!
//! Gatehouse does not own user accounts — the identity backend does
//! (a database, LDAP, an auth service). This crate only defines the seam:
//! a synchronous trait the resolver calls with the decoded username and
//! password. Implement it against your backend; use a fixed-list
//! implementation in tests.

use gatehouse_core::Fault;

/// The backend's answer for a successful verification.
///
/// Carries the canonical user name (the backend may normalize case or map
/// aliases). Group and project are not the backend's business — a fresh
/// login always starts in the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    /// Canonical user name.
    pub user: String,
}

impl VerifiedUser {
    /// Wraps a canonical user name.
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// Validates a username/password pair against the identity backend.
///
/// # Errors
///
/// - [`Fault::access_denied`] — the credentials are wrong; the resolver
///   answers with a challenge instead of propagating
/// - any other kind — backend trouble; propagated unchanged to the error
///   mapper
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Verifies the pair, returning the canonical user on success.
    fn verify(&self, username: &str, password: &str)
    -> Result<VerifiedUser, Fault>;
}
