//! Shared leaf types for Gatehouse.
//!
//! Every other crate in the workspace depends on this one. It holds the two
//! types that travel through the whole request path:
//!
//! 1. [`Identity`] — the resolved (user, group, project) triple that every
//!    request carries, anonymous by default
//! 2. [`Fault`] — the classified failure that selects the client-visible
//!    response mapping
//!
//! # How it fits in the stack
//!
//! ```text
//! gatehouse (dispatcher, error mapper)
//!     ↕
//! gatehouse-session / gatehouse-render / gatehouse-cache
//!     ↕
//! gatehouse-core (this crate)  ← leaf types, no dependencies upward
//! ```

mod fault;
mod identity;

pub use fault::{Cause, Fault, FaultKind};
pub use identity::{ANONYMOUS_USER, DEFAULT_GROUP, DEFAULT_PROJECT, Identity};
