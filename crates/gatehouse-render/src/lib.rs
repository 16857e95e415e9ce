//! The rendering seam: where the front door hands off to content.
//!
//! Gatehouse treats storage and rendering as opaque collaborators behind
//! three contracts:
//!
//! - [`ResourceStore`] — locates a resource for an identity and owns the
//!   monotonic content-change counter
//! - [`Renderer`] — turns one resource type into a byte payload; selected
//!   from the [`RendererRegistry`] by the resource's type key
//! - [`RenderContext`] — what a renderer may touch while rendering: the
//!   request identity (mutably — a template can switch group or project)
//!   and the process-wide caches
//!
//! Renderers are registered once at startup; there is no runtime
//! discovery.

mod registry;

pub use registry::RendererRegistry;

use gatehouse_cache::CacheController;
use gatehouse_core::{Fault, Identity};
use gatehouse_transport::Response;

/// An opaque resource handle produced by the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Storage path the resource was located at.
    pub path: String,

    /// Type key selecting the renderer (e.g. "plain", "template").
    pub type_key: String,

    /// Content type the prepared response should carry.
    pub content_type: String,

    /// Raw resource bytes as stored.
    pub data: Vec<u8>,
}

/// The storage layer, as seen from the front door.
pub trait ResourceStore: Send + Sync + 'static {
    /// Locates the resource at `path` as visible to `identity`.
    ///
    /// # Errors
    ///
    /// - [`Fault::not_found`] — nothing at that path
    /// - [`Fault::access_denied`] — the identity may not read it
    /// - any other kind — storage trouble
    fn locate(&self, identity: &Identity, path: &str)
    -> Result<Resource, Fault>;

    /// The monotonic content-change counter, incremented by the storage
    /// layer on every content mutation. Read-only here; the cache
    /// controller compares it against cache generations.
    fn change_counter(&self) -> u64;
}

/// What a renderer may read and mutate while producing output.
pub struct RenderContext<'a> {
    /// The request identity. Group and project changes made here are
    /// persisted to the session store after a successful render.
    pub identity: &'a mut Identity,

    /// The process-wide caches, for renderers that memoize derived
    /// content.
    pub caches: &'a CacheController,
}

/// One rendering capability, registered per resource type.
pub trait Renderer: Send + Sync + 'static {
    /// Prepares the response before rendering. The default sets the
    /// resource's content type and nothing else.
    fn prepare(
        &self,
        resource: &Resource,
        response: &mut dyn Response,
    ) -> Result<(), Fault> {
        response.set_content_type(&resource.content_type);
        Ok(())
    }

    /// Produces the response payload for one resource.
    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        resource: &Resource,
    ) -> Result<Vec<u8>, Fault>;
}

#[cfg(test)]
mod tests {
    use gatehouse_transport::mem::MemResponse;

    use super::*;

    struct Passthrough;

    impl Renderer for Passthrough {
        fn render(
            &self,
            _ctx: &mut RenderContext<'_>,
            resource: &Resource,
        ) -> Result<Vec<u8>, Fault> {
            Ok(resource.data.clone())
        }
    }

    #[test]
    fn test_default_prepare_sets_content_type() {
        let resource = Resource {
            path: "/a.txt".into(),
            type_key: "plain".into(),
            content_type: "text/plain".into(),
            data: b"hi".to_vec(),
        };
        let mut response = MemResponse::new();
        Passthrough
            .prepare(&resource, &mut response)
            .expect("prepare");
        assert_eq!(response.content_type(), Some("text/plain"));
    }
}
