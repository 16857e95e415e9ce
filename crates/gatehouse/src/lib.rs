//! # Gatehouse
//!
//! The front door of a content server. For every request, Gatehouse:
//!
//! 1. resolves the caller to an identity (session → Basic credentials →
//!    anonymous)
//! 2. locates the requested resource in storage
//! 3. clears whatever derived-content caches have gone stale
//! 4. dispatches to the renderer registered for the resource's type
//! 5. persists the (possibly render-mutated) identity back to the session
//!    store
//! 6. maps any classified failure to the right client response
//!
//! Storage, template evaluation, and concrete renderers are collaborators
//! behind traits — Gatehouse orchestrates, it does not render.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatehouse::prelude::*;
//!
//! # async fn run(store: Arc<dyn ResourceStore>, verifier: Arc<dyn CredentialVerifier>) -> Result<(), GatehouseError> {
//! let gatehouse = Gatehouse::builder(store, verifier)
//!     .cache("template", Arc::new(ContentCache::<Vec<u8>>::new()))
//!     .build();
//!
//! let server = GatehouseServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(Arc::new(gatehouse))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod context;
mod dispatch;
mod error;
mod http;
mod respond;
mod server;

pub use config::{DetailExposure, GatehouseConfig, NotFoundStatus};
pub use context::{Gatehouse, GatehouseBuilder};
pub use error::GatehouseError;
pub use http::{HttpRequest, HttpResponse};
pub use server::{GatehouseServer, GatehouseServerBuilder};

/// Everything an embedding host or demo binary typically needs.
pub mod prelude {
    pub use gatehouse_cache::{CacheController, ContentCache, FlushTarget};
    pub use gatehouse_core::{Fault, FaultKind, Identity};
    pub use gatehouse_render::{
        RenderContext, Renderer, RendererRegistry, Resource, ResourceStore,
    };
    pub use gatehouse_session::{
        BadCredentialPolicy, CredentialVerifier, SessionRecord,
        SessionStore, VerifiedUser,
    };
    pub use gatehouse_transport::{
        Request, Response, Session, SessionRegistry, TransportError,
    };

    pub use crate::{
        DetailExposure, Gatehouse, GatehouseBuilder, GatehouseConfig,
        GatehouseError, GatehouseServer, GatehouseServerBuilder,
        NotFoundStatus,
    };
}
