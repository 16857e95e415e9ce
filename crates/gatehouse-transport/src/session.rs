//! Transport sessions and the registry that owns their lifetimes.
//!
//! The registry is the Rust stand-in for what a hosting container would
//! normally provide: create a session, find it again by id, and destroy it
//! when it expires or is invalidated. Destruction must be observable —
//! the identity layer hangs a notice on each session so its store entry
//! is removed when the session dies. A notice fires exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rand::Rng;

/// Callback invoked with the session id when the session is destroyed.
pub type DestructionNotice = Box<dyn Fn(&str) + Send + Sync + 'static>;

struct SessionInner {
    id: String,
    attributes: RwLock<HashMap<String, String>>,
    on_destroy: Mutex<Option<DestructionNotice>>,
    notice_registered: Mutex<bool>,
    last_access: Mutex<Instant>,
}

/// A cheap-clone handle to one transport session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                attributes: RwLock::new(HashMap::new()),
                on_destroy: Mutex::new(None),
                notice_registered: Mutex::new(false),
                last_access: Mutex::new(Instant::now()),
            }),
        }
    }

    /// The opaque session id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Reads a keyed attribute.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.inner.attributes.read().get(key).cloned()
    }

    /// Stores a keyed attribute, replacing any previous value.
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.attributes.write().insert(key.into(), value.into());
    }

    /// Registers the destruction notice. First registration wins; returns
    /// `false` (and drops the notice) if one is already registered.
    pub fn register_on_destroy(&self, notice: DestructionNotice) -> bool {
        let mut registered = self.inner.notice_registered.lock();
        if *registered {
            return false;
        }
        *self.inner.on_destroy.lock() = Some(notice);
        *registered = true;
        true
    }

    /// Whether a destruction notice has been registered.
    pub fn has_on_destroy(&self) -> bool {
        *self.inner.notice_registered.lock()
    }

    fn touch(&self) {
        *self.inner.last_access.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.inner.last_access.lock().elapsed()
    }

    /// Fires the destruction notice. `Option::take` guarantees at most one
    /// invocation even if destruction races with a sweep.
    fn fire_destruction(&self) {
        let notice = self.inner.on_destroy.lock().take();
        if let Some(notice) = notice {
            notice(&self.inner.id);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

/// Owns every live transport session in the process.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a fresh session.
    pub fn create(&self) -> Session {
        let session = Session::new(generate_session_id());
        self.sessions
            .write()
            .insert(session.id().to_string(), session.clone());
        tracing::debug!(session_id = %session.id(), "transport session created");
        session
    }

    /// Looks up a live session by id, refreshing its last-access time.
    pub fn lookup(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        session
    }

    /// Destroys a session, firing its destruction notice. Idempotent.
    pub fn invalidate(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(session) => {
                session.fire_destruction();
                tracing::debug!(session_id = %id, "transport session invalidated");
                true
            }
            None => false,
        }
    }

    /// Destroys every session idle longer than `ttl`, firing each
    /// destruction notice. Returns the expired ids.
    pub fn sweep_expired(&self, ttl: Duration) -> Vec<String> {
        let expired: Vec<Session> = {
            let sessions = self.sessions.read();
            sessions
                .values()
                .filter(|s| s.idle_for() > ttl)
                .cloned()
                .collect()
        };

        let mut ids = Vec::with_capacity(expired.len());
        if !expired.is_empty() {
            let mut sessions = self.sessions.write();
            for session in expired {
                if sessions.remove(session.id()).is_some() {
                    session.fire_destruction();
                    tracing::debug!(
                        session_id = %session.id(),
                        "transport session expired"
                    );
                    ids.push(session.id().to_string());
                }
            }
        }
        ids
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Generates a random 32-character hex session id (128 bits of entropy).
fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
