//! The process context: one `Gatehouse` per process.
//!
//! Everything request handling shares — the session store, the cache
//! controller, the renderer registry, the collaborator handles — lives
//! here, built once at startup and injected (behind `Arc`) into every
//! request task. There are no global statics; two `Gatehouse` values are
//! two independent front doors.

use std::sync::Arc;

use gatehouse_cache::{CacheController, FlushTarget};
use gatehouse_render::{Renderer, RendererRegistry, ResourceStore};
use gatehouse_session::{CredentialVerifier, IdentityResolver, SessionStore};
use gatehouse_transport::{Request, Response, SessionRegistry};

use crate::GatehouseConfig;
use crate::dispatch;

/// Builder for a [`Gatehouse`].
///
/// Caches and renderers are registered here, at startup — the registry is
/// read-only once built.
pub struct GatehouseBuilder {
    resources: Arc<dyn ResourceStore>,
    verifier: Arc<dyn CredentialVerifier>,
    config: GatehouseConfig,
    caches: CacheController,
    renderers: RendererRegistry,
}

impl GatehouseBuilder {
    /// Starts a builder over the two mandatory collaborators.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            resources,
            verifier,
            config: GatehouseConfig::default(),
            caches: CacheController::new(),
            renderers: RendererRegistry::new(),
        }
    }

    /// Replaces the default configuration.
    pub fn config(mut self, config: GatehouseConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a named cache with the invalidation controller.
    pub fn cache(
        self,
        name: impl Into<String>,
        target: Arc<dyn FlushTarget>,
    ) -> Self {
        self.caches.register(name, target);
        self
    }

    /// Registers a renderer for a resource type key.
    pub fn renderer(
        mut self,
        type_key: impl Into<String>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        self.renderers.register(type_key, renderer);
        self
    }

    /// Builds the process context.
    pub fn build(self) -> Gatehouse {
        let sessions = Arc::new(SessionStore::new());
        let resolver = IdentityResolver::new(
            Arc::clone(&sessions),
            self.verifier,
            self.config.realm.clone(),
            self.config.bad_credentials,
        );
        Gatehouse {
            config: self.config,
            sessions,
            transport_sessions: Arc::new(SessionRegistry::new()),
            resolver,
            resources: self.resources,
            caches: self.caches,
            renderers: self.renderers,
        }
    }
}

/// The front door's process-wide state. Single instance per process;
/// shared across request tasks behind `Arc`.
pub struct Gatehouse {
    config: GatehouseConfig,
    sessions: Arc<SessionStore>,
    transport_sessions: Arc<SessionRegistry>,
    resolver: IdentityResolver,
    resources: Arc<dyn ResourceStore>,
    caches: CacheController,
    renderers: RendererRegistry,
}

impl Gatehouse {
    /// Starts a [`GatehouseBuilder`].
    pub fn builder(
        resources: Arc<dyn ResourceStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> GatehouseBuilder {
        GatehouseBuilder::new(resources, verifier)
    }

    /// Handles one request end to end: the full dispatch state machine
    /// including failure mapping. Synchronous; never panics or raises.
    pub fn handle(&self, request: &dyn Request, response: &mut dyn Response) {
        dispatch::dispatch(self, request, response);
    }

    /// The active configuration.
    pub fn config(&self) -> &GatehouseConfig {
        &self.config
    }

    /// The session-id → identity store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// The transport-session registry (the HTTP host creates, looks up,
    /// and sweeps sessions here).
    pub fn transport_sessions(&self) -> &Arc<SessionRegistry> {
        &self.transport_sessions
    }

    /// The identity resolver.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// The storage collaborator.
    pub fn resources(&self) -> &Arc<dyn ResourceStore> {
        &self.resources
    }

    /// The cache invalidation controller.
    pub fn caches(&self) -> &CacheController {
        &self.caches
    }

    /// The renderer registry.
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }
}
