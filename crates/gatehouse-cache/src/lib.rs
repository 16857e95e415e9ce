//! Cache invalidation for Gatehouse.
//!
//! Rendering derives content (parsed templates, assembled pages) that is
//! cached process-wide. The storage layer counts content mutations with a
//! monotonic counter; each named cache remembers the counter value it last
//! reflected (its *generation*). Before rendering, the dispatcher asks the
//! [`CacheController`] to clear whatever has gone stale — or whatever an
//! explicit override token demands.
//!
//! State here is process-wide and shared by every request; none of it is
//! per-session.

mod content;
mod controller;

pub use content::{ContentCache, FlushTarget};
pub use controller::{CacheController, FLUSH_ALL_TOKEN};
