//! In-memory transport, for embedding Gatehouse without an HTTP stack and
//! for exercising the request path in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{Request, Response, Session, SessionRegistry, TransportError};

/// A hand-built request. Headers and parameters are set up front; the
/// session is either pre-attached or created lazily through the shared
/// registry, exactly like a real transport would.
pub struct MemRequest {
    path: String,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    registry: Arc<SessionRegistry>,
    session: RefCell<Option<Session>>,
}

impl MemRequest {
    /// A request for `path` with its own private session registry.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_registry(path, Arc::new(SessionRegistry::new()))
    }

    /// A request for `path` using a shared registry, so sessions survive
    /// across requests the way they do in a real host.
    pub fn with_registry(
        path: impl Into<String>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            path: path.into(),
            headers: HashMap::new(),
            parameters: HashMap::new(),
            registry,
            session: RefCell::new(None),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a query parameter.
    pub fn parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    /// Attaches an existing session, as if the client had sent its cookie.
    pub fn attach_session(self, session: Session) -> Self {
        *self.session.borrow_mut() = Some(session);
        self
    }

    /// The session currently attached to this request, if any.
    pub fn attached_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }
}

impl Request for MemRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn session(&self, create_if_absent: bool) -> Option<Session> {
        let mut slot = self.session.borrow_mut();
        if slot.is_none() && create_if_absent {
            *slot = Some(self.registry.create());
        }
        slot.clone()
    }
}

/// A response buffer that records everything written to it. An injected
/// write failure simulates a client that went away mid-response.
#[derive(Default)]
pub struct MemResponse {
    status: Option<u16>,
    headers: HashMap<String, String>,
    content_type: Option<String>,
    body: Vec<u8>,
    fail_writes: bool,
}

impl MemResponse {
    /// An empty response buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A response buffer whose body writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// The status that was set, if any. The host treats "unset" as 200.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// A header that was set, by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The Content-Type that was set, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The accumulated body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8, lossily.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Response for MemResponse {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    fn set_content_type(&mut self, value: &str) {
        self.content_type = Some(value.to_string());
    }

    fn write_body(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::Closed);
        }
        self.body.extend_from_slice(data);
        Ok(())
    }
}
