//! Startup-time renderer registry.
//!
//! A resource names its renderer with a type key; the registry maps keys
//! to renderer instances. It is populated while the process context is
//! being built and read-only afterwards, so lookups take no lock.

use std::collections::HashMap;
use std::sync::Arc;

use gatehouse_core::Fault;

use crate::Renderer;

/// Maps resource type keys to their renderers.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn Renderer>>,
}

impl RendererRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a renderer for a type key, replacing any previous one.
    pub fn register(
        &mut self,
        type_key: impl Into<String>,
        renderer: Arc<dyn Renderer>,
    ) {
        self.renderers.insert(type_key.into(), renderer);
    }

    /// The renderer for a type key.
    ///
    /// # Errors
    ///
    /// A generic fault naming the unknown type — a resource pointing at
    /// an unregistered renderer is a deployment mistake, not a missing
    /// page.
    pub fn get(&self, type_key: &str) -> Result<Arc<dyn Renderer>, Fault> {
        self.renderers.get(type_key).cloned().ok_or_else(|| {
            Fault::generic(format!(
                "no renderer registered for resource type '{type_key}'"
            ))
        })
    }

    /// Number of registered renderers.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Whether no renderers are registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}
