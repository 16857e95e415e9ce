//! Top-level error type for embedding hosts.

use gatehouse_core::Fault;
use gatehouse_transport::TransportError;
use thiserror::Error;

/// Anything that can go wrong while standing up or running the front
/// door. Request-level failures never surface here — the dispatcher
/// turns those into responses.
#[derive(Debug, Error)]
pub enum GatehouseError {
    /// A classified request-path failure escaped into host code.
    #[error("request fault: {0}")]
    Fault(#[from] Fault),

    /// The transport layer failed outside a request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Binding or serving the listener failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
