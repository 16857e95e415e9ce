//! The session store: transport-session id → resolved identity attributes.
//!
//! One entry per live transport session, created lazily on the first
//! successful authentication and removed by the session's destruction
//! notice — the store must never outlive the sessions it describes.
//!
//! # Concurrency note
//!
//! The store is shared by every in-flight request, so unlike a
//! single-owner map it locks internally: a `parking_lot::RwLock` around
//! the map gives per-key atomic point operations. Same-key races are
//! last-writer-wins, which is acceptable — concurrent requests on one
//! session carry the same identity anyway. No ordering is guaranteed
//! across distinct keys.

use std::collections::HashMap;

use gatehouse_core::Identity;
use parking_lot::RwLock;

/// The identity attributes stored for one transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Authenticated user name.
    pub user: String,
    /// Group the session last acted in.
    pub group: String,
    /// Project the session last acted in.
    pub project: String,
}

impl SessionRecord {
    /// Builds a record from explicit parts.
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

    /// Snapshots an identity into a record.
    pub fn from_identity(identity: &Identity) -> Self {
        Self::new(&identity.user, &identity.group, &identity.project)
    }

    /// Rehydrates the identity this record describes.
    pub fn identity(&self) -> Identity {
        Identity::new(&self.user, &self.group, &self.project)
    }
}

/// Concurrent map from transport-session id to [`SessionRecord`].
#[derive(Default)]
pub struct SessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for a session id.
    pub fn put(&self, session_id: &str, record: SessionRecord) {
        self.records
            .write()
            .insert(session_id.to_string(), record);
    }

    /// Looks up the record for a session id.
    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.records.read().get(session_id).cloned()
    }

    /// Removes the record for a session id. Idempotent; returns whether an
    /// entry was present.
    pub fn remove(&self, session_id: &str) -> bool {
        self.records.write().remove(session_id).is_some()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
