//! Transport abstraction layer for Gatehouse.
//!
//! The core request path never talks to a concrete HTTP stack. It sees two
//! traits — [`Request`] and [`Response`] — plus the concrete [`Session`]
//! handle managed by the [`SessionRegistry`]. The axum host in the
//! `gatehouse` crate is one implementation; the [`mem`] module is another,
//! used for embedding and tests.
//!
//! # Sessions
//!
//! A transport session is the hosting layer's object: an opaque id, a keyed
//! attribute store, and at most one destruction notice. It is distinct from
//! the session *record* the identity layer keeps — the record is keyed by
//! the transport session's id and must die with it, which is exactly what
//! the destruction notice is for.

mod error;
pub mod mem;
mod session;

pub use error::TransportError;
pub use session::{DestructionNotice, Session, SessionRegistry};

/// An inbound request, reduced to what the front door needs.
pub trait Request {
    /// The resource path being requested (no query string).
    fn path(&self) -> &str;

    /// Looks up a header by name. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    /// Looks up a query parameter by name.
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Returns the transport session attached to this request.
    ///
    /// With `create_if_absent` set, a missing session is created on the
    /// spot and attached; without it, `None` means the caller has no live
    /// session.
    fn session(&self, create_if_absent: bool) -> Option<Session>;
}

/// An outbound response under construction.
pub trait Response {
    /// Sets the status code. Later calls win.
    fn set_status(&mut self, status: u16);

    /// Sets a header, replacing any previous value for the same name.
    fn set_header(&mut self, name: &str, value: &str);

    /// Sets the Content-Type header.
    fn set_content_type(&mut self, value: &str);

    /// Appends bytes to the response body.
    fn write_body(&mut self, data: &[u8]) -> Result<(), TransportError>;
}
