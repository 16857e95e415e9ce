//! The invalidation controller: per-cache generations against the
//! storage change counter.
//!
//! Staleness rule: a cache whose generation is behind the current counter
//! gets a full clear, then its generation catches up. An override token
//! forces the clear regardless: `"all"` hits every registered cache, a
//! token equal to one cache's name hits just that cache, anything else
//! falls through to the counter comparison.
//!
//! Each registered cache carries its own lock held across
//! clear-and-commit, with a staleness re-check under it — two requests
//! racing on the same stale cache produce one clear, and a clear of one
//! cache never blocks readers of another.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::content::FlushTarget;

/// Override token that clears every registered cache.
pub const FLUSH_ALL_TOKEN: &str = "all";

struct CacheSlot {
    target: Arc<dyn FlushTarget>,
    /// Generation counter, doubling as the per-cache clear lock.
    generation: Mutex<u64>,
}

impl CacheSlot {
    fn is_due(&self, override_token: Option<&str>, name: &str, counter: u64) -> bool {
        let forced = matches!(
            override_token,
            Some(token) if token == FLUSH_ALL_TOKEN || token == name
        );
        forced || counter > *self.generation.lock()
    }
}

/// Tracks every named cache and decides when each must be cleared.
#[derive(Default)]
pub struct CacheController {
    slots: RwLock<HashMap<String, Arc<CacheSlot>>>,
}

impl CacheController {
    /// Creates a controller with no registered caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named cache at generation zero, replacing any previous
    /// registration under the same name.
    pub fn register(
        &self,
        name: impl Into<String>,
        target: Arc<dyn FlushTarget>,
    ) {
        let name = name.into();
        self.slots.write().insert(
            name,
            Arc::new(CacheSlot {
                target,
                generation: Mutex::new(0),
            }),
        );
    }

    /// The registered cache under `name`, for readers.
    pub fn target(&self, name: &str) -> Option<Arc<dyn FlushTarget>> {
        self.slots.read().get(name).map(|slot| Arc::clone(&slot.target))
    }

    /// The current generation of a registered cache.
    pub fn generation(&self, name: &str) -> Option<u64> {
        self.slots
            .read()
            .get(name)
            .map(|slot| *slot.generation.lock())
    }

    /// Names of the caches that `flush_stale` would clear right now,
    /// sorted. Read-only: nothing is cleared or committed.
    pub fn evaluate(
        &self,
        override_token: Option<&str>,
        current_counter: u64,
    ) -> Vec<String> {
        let mut due: Vec<String> = self
            .slots
            .read()
            .iter()
            .filter(|(name, slot)| {
                slot.is_due(override_token, name, current_counter)
            })
            .map(|(name, _)| name.clone())
            .collect();
        due.sort();
        due
    }

    /// Advances a cache's generation to `current_counter`. Generations
    /// never decrease; a lagging counter leaves the stored value alone.
    /// Returns `false` for an unregistered name.
    pub fn commit(&self, name: &str, current_counter: u64) -> bool {
        let slot = match self.slots.read().get(name) {
            Some(slot) => Arc::clone(slot),
            None => return false,
        };
        let mut generation = slot.generation.lock();
        *generation = (*generation).max(current_counter);
        true
    }

    /// Clears every cache that is stale (or forced by the override token)
    /// and commits its generation, atomically per cache. Returns the
    /// names cleared, sorted.
    pub fn flush_stale(
        &self,
        override_token: Option<&str>,
        current_counter: u64,
    ) -> Vec<String> {
        let snapshot: Vec<(String, Arc<CacheSlot>)> = self
            .slots
            .read()
            .iter()
            .map(|(name, slot)| (name.clone(), Arc::clone(slot)))
            .collect();

        let mut cleared = Vec::new();
        for (name, slot) in snapshot {
            let mut generation = slot.generation.lock();
            // Re-check under the lock: a racing request may have cleared
            // and committed this cache already.
            let forced = matches!(
                override_token,
                Some(token) if token == FLUSH_ALL_TOKEN || token == name
            );
            if !forced && current_counter <= *generation {
                continue;
            }
            slot.target.clear();
            *generation = (*generation).max(current_counter);
            tracing::info!(
                cache = %name,
                generation = current_counter,
                forced,
                "cache cleared"
            );
            cleared.push(name);
        }
        cleared.sort();
        cleared
    }
}
