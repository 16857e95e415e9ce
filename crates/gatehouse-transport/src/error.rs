/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Writing the response body failed.
    #[error("body write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The client went away before the response was written.
    #[error("connection closed")]
    Closed,
}
