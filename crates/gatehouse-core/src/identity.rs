//! The per-request identity triple.
//!
//! Resolution never leaves a request without an identity: if neither the
//! session store nor the credential header produces one, the request runs
//! as the anonymous user with the default group and project.

use std::fmt;

/// User name assigned when no authentication succeeds.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Group assigned to freshly authenticated and anonymous identities.
pub const DEFAULT_GROUP: &str = "guests";

/// Project assigned to freshly authenticated and anonymous identities.
pub const DEFAULT_PROJECT: &str = "live";

/// The resolved identity a request runs under.
///
/// Group and project may be rewritten by the render step (a template can
/// switch the caller into another project); the dispatcher persists the
/// final values back into the session store after a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated user name, or [`ANONYMOUS_USER`].
    pub user: String,

    /// Group the request currently acts in.
    pub group: String,

    /// Project the request currently acts in.
    pub project: String,
}

impl Identity {
    /// Creates an identity from explicit parts.
    pub fn new(
        user: impl Into<String>,
        group: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            group: group.into(),
            project: project.into(),
        }
    }

    /// Creates an identity for an authenticated user with the default
    /// group and project.
    pub fn authenticated(user: impl Into<String>) -> Self {
        Self::new(user, DEFAULT_GROUP, DEFAULT_PROJECT)
    }

    /// The fallback identity used absent any successful authentication.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER, DEFAULT_GROUP, DEFAULT_PROJECT)
    }

    /// Returns `true` if this is the anonymous fallback user.
    pub fn is_anonymous(&self) -> bool {
        self.user == ANONYMOUS_USER
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.user, self.group, self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_uses_defaults() {
        let id = Identity::anonymous();
        assert_eq!(id.user, ANONYMOUS_USER);
        assert_eq!(id.group, DEFAULT_GROUP);
        assert_eq!(id.project, DEFAULT_PROJECT);
        assert!(id.is_anonymous());
    }

    #[test]
    fn test_authenticated_is_not_anonymous() {
        let id = Identity::authenticated("alice");
        assert_eq!(id.user, "alice");
        assert_eq!(id.group, DEFAULT_GROUP);
        assert!(!id.is_anonymous());
    }

    #[test]
    fn test_display_format() {
        let id = Identity::new("bob", "editors", "offline");
        assert_eq!(id.to_string(), "bob@editors/offline");
    }
}
