//! Flushable caches.
//!
//! The controller does not care what a cache holds, only that it can be
//! cleared as a unit — that's the [`FlushTarget`] trait. [`ContentCache`]
//! is the concrete map used for the file and template caches; renderers
//! read and populate it through [`gatehouse-render`'s render
//! context](../gatehouse_render/struct.RenderContext.html).

use std::collections::HashMap;

use parking_lot::RwLock;

/// A named cache the controller can clear wholesale.
///
/// Implementations guard their contents with interior locking so that a
/// clear is never observed half-done by a concurrent reader.
pub trait FlushTarget: Send + Sync + 'static {
    /// Discards every entry.
    fn clear(&self);

    /// Number of cached entries.
    fn len(&self) -> usize;

    /// Whether the cache holds nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A string-keyed cache of derived values.
///
/// Reads take the shared lock; `insert` and `clear` take the exclusive
/// one, so readers see the map before or after a clear, never mid-clear.
pub struct ContentCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> ContentCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for ContentCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ContentCache<V> {
    /// Looks up a cached value.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Caches a value, replacing any previous entry for the key.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.write().insert(key.into(), value);
    }
}

impl<V: Send + Sync + 'static> FlushTarget for ContentCache<V> {
    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_and_clear() {
        let cache = ContentCache::new();
        cache.insert("a", 1u64);
        cache.insert("b", 2u64);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let cache = ContentCache::new();
        cache.insert("k", "old".to_string());
        cache.insert("k", "new".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }
}
