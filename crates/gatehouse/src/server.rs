//! `GatehouseServer` builder and HTTP host.
//!
//! The host owns the listener, the session-sweep task, and the bridge
//! between async axum handlers and the synchronous request core: each
//! request is flattened into an [`HttpRequest`], dispatched on a
//! blocking thread, and the buffered [`HttpResponse`] converted back.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use tokio::net::TcpListener;

use crate::context::Gatehouse;
use crate::error::GatehouseError;
use crate::http::{HttpRequest, HttpResponse};

/// Builder for configuring and starting a Gatehouse HTTP host.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::prelude::*;
///
/// let server = GatehouseServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(Arc::new(gatehouse))
///     .await?;
/// server.run().await
/// ```
pub struct GatehouseServerBuilder {
    bind_addr: String,
}

impl GatehouseServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and builds the server around a process
    /// context.
    pub async fn build(
        self,
        gatehouse: Arc<Gatehouse>,
    ) -> Result<GatehouseServer, GatehouseError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "gatehouse listening");
        Ok(GatehouseServer {
            listener,
            local_addr,
            gatehouse,
        })
    }
}

impl Default for GatehouseServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Gatehouse HTTP host.
///
/// Call [`run()`](Self::run) to start serving requests.
pub struct GatehouseServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    gatehouse: Arc<Gatehouse>,
}

impl GatehouseServer {
    /// Creates a new builder.
    pub fn builder() -> GatehouseServerBuilder {
        GatehouseServerBuilder::new()
    }

    /// The local address the server is bound to. Useful with a port-0
    /// bind.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until the process stops.
    ///
    /// Every path falls through to the dispatcher; the session sweep
    /// runs on its own task at the configured interval.
    pub async fn run(self) -> Result<(), GatehouseError> {
        spawn_session_sweep(Arc::clone(&self.gatehouse));

        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&self.gatehouse));
        axum::serve(self.listener, router).await?;
        Ok(())
    }
}

/// Destroys idle transport sessions in the background. Each destruction
/// fires the session's notice, which drops its identity record.
fn spawn_session_sweep(gatehouse: Arc<Gatehouse>) {
    let ttl = gatehouse.config().session_ttl;
    let interval = gatehouse.config().sweep_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // the first tick is immediate
        loop {
            ticker.tick().await;
            let expired = gatehouse.transport_sessions().sweep_expired(ttl);
            if !expired.is_empty() {
                tracing::info!(
                    count = expired.len(),
                    "expired transport sessions swept"
                );
            }
        }
    });
}

/// The one axum handler: flatten, dispatch on a blocking thread,
/// convert back.
async fn handle(
    State(gatehouse): State<Arc<Gatehouse>>,
    request: axum::http::Request<Body>,
) -> axum::response::Response {
    let (parts, _body) = request.into_parts();

    let dispatched = tokio::task::spawn_blocking(move || {
        let cookie_name = gatehouse.config().session_cookie.clone();
        let request = HttpRequest::from_parts(
            &parts,
            Arc::clone(gatehouse.transport_sessions()),
            &cookie_name,
        );
        let mut response = HttpResponse::new();
        gatehouse.handle(&request, &mut response);
        if let Some(id) = request.created_session_id() {
            response.set_session_cookie(&cookie_name, &id);
        }
        response.into_axum()
    })
    .await;

    match dispatched {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "request task failed");
            let mut fallback = axum::response::Response::new(Body::empty());
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        }
    }
}
