//! Process-wide configuration.

use std::time::Duration;

use gatehouse_session::BadCredentialPolicy;

/// Which status accompanies the inline not-found error page.
///
/// The legacy front door wrote the styled body on a 200 and never set a
/// not-found status; some clients grew to depend on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundStatus {
    /// Set 404 alongside the error page.
    #[default]
    Correct,

    /// Leave the status alone (legacy body-on-200 behavior).
    Legacy,
}

/// When generic error pages may include wrapped-cause detail.
///
/// Cause chains can leak internals (paths, hosts, SQL); they are useful
/// to editors debugging templates and to nobody else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailExposure {
    /// Never show cause text.
    #[default]
    Never,

    /// Show cause text only to a non-anonymous resolved identity.
    NonAnonymous,
}

/// Configuration for the front door. Start from `Default` and override
/// what you need.
#[derive(Debug, Clone)]
pub struct GatehouseConfig {
    /// Realm announced in authentication challenges.
    pub realm: String,

    /// Query parameter carrying the cache-flush override token.
    pub flush_param: String,

    /// Cookie the HTTP host uses to carry the transport-session id.
    pub session_cookie: String,

    /// How long an idle transport session lives before the sweep
    /// destroys it.
    pub session_ttl: Duration,

    /// How often the HTTP host sweeps expired transport sessions.
    pub sweep_interval: Duration,

    /// What to do when presented credentials are rejected.
    pub bad_credentials: BadCredentialPolicy,

    /// Status policy for not-found error pages.
    pub not_found_status: NotFoundStatus,

    /// Cause-detail policy for generic error pages.
    pub detail_exposure: DetailExposure,
}

impl Default for GatehouseConfig {
    fn default() -> Self {
        Self {
            realm: "Gatehouse".to_string(),
            flush_param: "_flushcache".to_string(),
            session_cookie: "gatehouse_session".to_string(),
            session_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            bad_credentials: BadCredentialPolicy::default(),
            not_found_status: NotFoundStatus::default(),
            detail_exposure: DetailExposure::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_choose_the_safe_policies() {
        let config = GatehouseConfig::default();
        assert_eq!(config.bad_credentials, BadCredentialPolicy::Abort);
        assert_eq!(config.not_found_status, NotFoundStatus::Correct);
        assert_eq!(config.detail_exposure, DetailExposure::Never);
        assert!(!config.realm.is_empty());
    }
}
