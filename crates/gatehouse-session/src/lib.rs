//! Session tracking and identity resolution for Gatehouse.
//!
//! This crate answers one question per request: *who is calling?* It does
//! so in three tiers, first match wins:
//!
//! 1. **Session** — the caller's transport session id is in the
//!    [`SessionStore`]; use the stored (user, group, project) verbatim
//! 2. **Credentials** — a Basic credential header is present; verify it
//!    against the [`CredentialVerifier`] backend and create a session
//! 3. **Anonymous** — neither applies; run as the anonymous identity
//!
//! # How it fits in the stack
//!
//! ```text
//! gatehouse (dispatcher)  ← calls resolve() first, persists identity last
//!     ↕
//! Session layer (this crate)
//!     ↕
//! gatehouse-transport  ← request headers, transport sessions
//! ```

mod resolver;
mod store;
mod verify;

pub use resolver::{
    AUTHORIZATION_HEADER, BadCredentialPolicy, FORCE_LOGIN_PARAM,
    FORCE_LOGIN_VALUE, IdentityResolver, ensure_removal_notice,
    send_challenge,
};
pub use store::{SessionRecord, SessionStore};
pub use verify::{CredentialVerifier, VerifiedUser};
