//! HTTP adapters: axum request/response types behind the transport
//! contracts.
//!
//! The adapters are plain data, built before dispatch and consumed
//! after, so the synchronous core can run on a blocking thread while the
//! async host keeps the connection. The transport-session id travels in
//! a cookie; a session created during dispatch is reported back so the
//! host can set it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::body::Body;
use axum::http::StatusCode;
use axum::http::request::Parts;
use parking_lot::Mutex;

use gatehouse_transport::{
    Request, Response, Session, SessionRegistry, TransportError,
};

/// One HTTP request, flattened for the dispatcher.
pub struct HttpRequest {
    path: String,
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    registry: Arc<SessionRegistry>,
    cookie_id: Option<String>,
    session: Mutex<Option<Session>>,
    created: AtomicBool,
}

impl HttpRequest {
    /// Builds the adapter from decomposed request parts. Header names
    /// are lowercased; for a repeated header the first value wins.
    pub fn from_parts(
        parts: &Parts,
        registry: Arc<SessionRegistry>,
        session_cookie: &str,
    ) -> Self {
        let mut headers = HashMap::new();
        for (name, value) in parts.headers.iter() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_ascii_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }
        let cookie_id = headers
            .get("cookie")
            .and_then(|cookies| cookie_value(cookies, session_cookie));
        Self {
            path: parts.uri.path().to_string(),
            params: parse_query(parts.uri.query().unwrap_or("")),
            headers,
            registry,
            cookie_id,
            session: Mutex::new(None),
            created: AtomicBool::new(false),
        }
    }

    /// The id of a session created during this request, for the
    /// host's Set-Cookie. `None` when the request rode an existing
    /// session or never got one.
    pub fn created_session_id(&self) -> Option<String> {
        if !self.created.load(Ordering::Acquire) {
            return None;
        }
        self.session
            .lock()
            .as_ref()
            .map(|session| session.id().to_string())
    }
}

impl Request for HttpRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn session(&self, create_if_absent: bool) -> Option<Session> {
        let mut slot = self.session.lock();
        if slot.is_none() {
            if let Some(id) = &self.cookie_id {
                *slot = self.registry.lookup(id);
            }
        }
        if slot.is_none() && create_if_absent {
            *slot = Some(self.registry.create());
            self.created.store(true, Ordering::Release);
        }
        slot.clone()
    }
}

/// The response under construction. Converted to an axum response once
/// dispatch finishes.
#[derive(Default)]
pub struct HttpResponse {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a Set-Cookie for a freshly created transport session.
    pub fn set_session_cookie(&mut self, cookie_name: &str, id: &str) {
        self.headers.push((
            "set-cookie".to_string(),
            format!("{cookie_name}={id}; Path=/; HttpOnly"),
        ));
    }

    /// Converts into the axum response the host returns.
    pub fn into_axum(self) -> axum::response::Response {
        let mut builder = axum::http::Response::builder()
            .status(self.status.unwrap_or(200));
        if let Some(content_type) = &self.content_type {
            builder = builder.header("content-type", content_type);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        match builder.body(Body::from(self.body)) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "response assembly failed");
                let mut fallback =
                    axum::response::Response::new(Body::empty());
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            }
        }
    }
}

impl Response for HttpResponse {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        for (existing, slot) in &mut self.headers {
            if *existing == name {
                *slot = value.to_string();
                return;
            }
        }
        self.headers.push((name, value.to_string()));
    }

    fn set_content_type(&mut self, value: &str) {
        self.content_type = Some(value.to_string());
    }

    fn write_body(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.body.extend_from_slice(data);
        Ok(())
    }
}

/// Parses a query string into a parameter map. Later duplicates of a
/// key overwrite earlier ones.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(percent_decode(key), percent_decode(value));
    }
    params
}

/// Decodes %XX escapes and `+`. Invalid escapes pass through verbatim.
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (hex(bytes.get(i + 1)), hex(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(byte: Option<&u8>) -> Option<u8> {
    let c = *byte? as char;
    c.to_digit(16).map(|digit| digit as u8)
}

/// Extracts one cookie's value from a Cookie header.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = axum::http::Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_parse_query_decodes_pairs() {
        let params = parse_query("a=1&b=hello+world&c=%2Fpath&empty");
        assert_eq!(params.get("a").map(String::as_str), Some("1"));
        assert_eq!(params.get("b").map(String::as_str), Some("hello world"));
        assert_eq!(params.get("c").map(String::as_str), Some("/path"));
        assert_eq!(params.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_percent_decode_passes_invalid_escape_through() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%zzb"), "a%zzb");
    }

    #[test]
    fn test_cookie_value_finds_named_cookie() {
        let header = "theme=dark; gatehouse_session=abc123; lang=en";
        assert_eq!(
            cookie_value(header, "gatehouse_session").as_deref(),
            Some("abc123"),
        );
        assert!(cookie_value(header, "missing").is_none());
    }

    #[test]
    fn test_request_resolves_session_from_cookie() {
        let registry = Arc::new(SessionRegistry::new());
        let session = registry.create();
        let cookie = format!("gatehouse_session={}", session.id());
        let parts = parts("/page", &[("cookie", &cookie)]);

        let request = HttpRequest::from_parts(
            &parts,
            Arc::clone(&registry),
            "gatehouse_session",
        );

        let found = request.session(false).expect("session from cookie");
        assert_eq!(found.id(), session.id());
        assert!(request.created_session_id().is_none());
    }

    #[test]
    fn test_request_creates_session_on_demand_and_reports_it() {
        let registry = Arc::new(SessionRegistry::new());
        let parts = parts("/page", &[]);
        let request = HttpRequest::from_parts(
            &parts,
            Arc::clone(&registry),
            "gatehouse_session",
        );

        assert!(request.session(false).is_none());
        let session = request.session(true).expect("created");
        assert_eq!(
            request.created_session_id().as_deref(),
            Some(session.id()),
        );
        // Repeated calls reuse the same session.
        assert_eq!(request.session(true).expect("reused").id(), session.id());
    }

    #[test]
    fn test_request_headers_are_case_insensitive() {
        let parts = parts("/p", &[("Authorization", "Basic abc")]);
        let request = HttpRequest::from_parts(
            &parts,
            Arc::new(SessionRegistry::new()),
            "gatehouse_session",
        );
        assert_eq!(request.header("AUTHORIZATION"), Some("Basic abc"));
    }

    #[test]
    fn test_response_set_header_replaces_existing_value() {
        let mut response = HttpResponse::new();
        response.set_header("X-Test", "one");
        response.set_header("x-test", "two");

        let axum_response = response.into_axum();
        assert_eq!(
            axum_response
                .headers()
                .get("x-test")
                .and_then(|v| v.to_str().ok()),
            Some("two"),
        );
    }

    #[test]
    fn test_response_defaults_to_200_with_content_type() {
        let mut response = HttpResponse::new();
        response.set_content_type("text/html");
        response.write_body(b"<p>ok</p>").expect("buffered write");

        let axum_response = response.into_axum();
        assert_eq!(axum_response.status(), StatusCode::OK);
        assert_eq!(
            axum_response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/html"),
        );
    }

    #[test]
    fn test_response_session_cookie_is_http_only() {
        let mut response = HttpResponse::new();
        response.set_session_cookie("gatehouse_session", "abc");
        let axum_response = response.into_axum();
        let cookie = axum_response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .expect("cookie header");
        assert!(cookie.starts_with("gatehouse_session=abc"));
        assert!(cookie.contains("HttpOnly"));
    }
}
