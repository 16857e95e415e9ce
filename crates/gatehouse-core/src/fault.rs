//! The classified failure type.
//!
//! Every failure that reaches the error mapper carries exactly one
//! [`FaultKind`]; the kind alone selects the client-visible response.
//! Collaborators (credential backend, resource locator, renderers) classify
//! their failures before returning them — nothing unclassified crosses the
//! dispatch boundary.

use std::fmt;

/// A wrapped underlying error, kept for logging and (policy-gated)
/// error-page detail.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The four response-selecting failure classes.
///
/// Kinds are total and mutually exclusive: a [`Fault`] has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The caller is not allowed to do this; answered with an
    /// authentication challenge.
    AccessDenied,

    /// The requested resource does not exist.
    NotFound,

    /// A backing service cannot answer right now.
    ServiceUnavailable,

    /// Anything else, wrapping the underlying error when there is one.
    Generic,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AccessDenied => "access denied",
            Self::NotFound => "not found",
            Self::ServiceUnavailable => "service unavailable",
            Self::Generic => "error",
        };
        f.write_str(name)
    }
}

/// A classified failure: kind, message, optional wrapped cause.
///
/// Constructed through the per-kind constructors so the kind is fixed at
/// the site that understands the failure. `#[source]` chains the cause into
/// the standard error machinery for logging.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
    #[source]
    cause: Option<Cause>,
}

impl Fault {
    fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// An access-denied fault; maps to an authentication challenge.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(FaultKind::AccessDenied, message)
    }

    /// A not-found fault; maps to the inline error page.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotFound, message)
    }

    /// A service-unavailable fault; maps to a terse 503.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ServiceUnavailable, message)
    }

    /// A generic fault with no underlying error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Generic, message)
    }

    /// Attaches the underlying error, keeping the kind.
    pub fn with_cause(
        mut self,
        cause: impl Into<Cause>,
    ) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The single kind this fault carries.
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// The human-readable message, without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped underlying error, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|c| c as _)
    }
}
