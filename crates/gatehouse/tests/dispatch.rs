//! End-to-end dispatch tests over the in-memory transport: a real
//! process context with stub storage, a fixed-list verifier, and three
//! small renderers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use gatehouse::prelude::*;
use gatehouse_transport::mem::{MemRequest, MemResponse};

/// Fixed resources plus a manual change counter.
struct DemoStore {
    resources: HashMap<String, Resource>,
    counter: AtomicU64,
}

impl DemoStore {
    fn new() -> Self {
        let mut resources = HashMap::new();
        for (path, type_key, data) in [
            ("/index.html", "plain", "welcome"),
            ("/private", "plain", "members only"),
            ("/switch", "switch", "switched"),
            ("/boom", "boom", ""),
            ("/odd", "mystery", ""),
        ] {
            resources.insert(
                path.to_string(),
                Resource {
                    path: path.to_string(),
                    type_key: type_key.to_string(),
                    content_type: "text/plain".to_string(),
                    data: data.as_bytes().to_vec(),
                },
            );
        }
        Self {
            resources,
            counter: AtomicU64::new(0),
        }
    }

    /// Simulates a content mutation.
    fn bump(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }
}

impl ResourceStore for DemoStore {
    fn locate(
        &self,
        identity: &Identity,
        path: &str,
    ) -> Result<Resource, Fault> {
        if path == "/whoami" {
            return Ok(Resource {
                path: path.to_string(),
                type_key: "plain".to_string(),
                content_type: "text/plain".to_string(),
                data: identity.user.clone().into_bytes(),
            });
        }
        if path == "/flaky" {
            return Err(Fault::service_unavailable("storage offline"));
        }
        if path == "/private" && identity.is_anonymous() {
            return Err(Fault::access_denied("login required for /private"));
        }
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| Fault::not_found(format!("no resource at {path}")))
    }

    fn change_counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// Accepts exactly alice:secret.
struct DemoVerifier;

impl CredentialVerifier for DemoVerifier {
    fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<VerifiedUser, Fault> {
        if username == "alice" && password == "secret" {
            Ok(VerifiedUser::new("alice"))
        } else {
            Err(Fault::access_denied("bad credentials"))
        }
    }
}

/// Passes the resource bytes through.
struct Plain;

impl Renderer for Plain {
    fn render(
        &self,
        _ctx: &mut RenderContext<'_>,
        resource: &Resource,
    ) -> Result<Vec<u8>, Fault> {
        Ok(resource.data.clone())
    }
}

/// Switches the request identity to the offline project mid-render.
struct SwitchProject;

impl Renderer for SwitchProject {
    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        resource: &Resource,
    ) -> Result<Vec<u8>, Fault> {
        ctx.identity.project = "offline".to_string();
        Ok(resource.data.clone())
    }
}

/// Mutates the identity and then fails, so tests can check that the
/// mutation is never persisted.
struct Boom;

impl Renderer for Boom {
    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        _resource: &Resource,
    ) -> Result<Vec<u8>, Fault> {
        ctx.identity.project = "offline".to_string();
        Err(Fault::generic("template exploded"))
    }
}

struct Harness {
    gatehouse: Gatehouse,
    store: Arc<DemoStore>,
    registry: Arc<SessionRegistry>,
    cache: Arc<ContentCache<String>>,
}

fn harness() -> Harness {
    let store = Arc::new(DemoStore::new());
    let cache: Arc<ContentCache<String>> = Arc::new(ContentCache::new());
    cache.insert("seed", "derived".to_string());

    let gatehouse = Gatehouse::builder(
        Arc::clone(&store) as Arc<dyn ResourceStore>,
        Arc::new(DemoVerifier),
    )
    .cache("template", Arc::clone(&cache) as Arc<dyn FlushTarget>)
    .renderer("plain", Arc::new(Plain))
    .renderer("switch", Arc::new(SwitchProject))
    .renderer("boom", Arc::new(Boom))
    .build();

    Harness {
        gatehouse,
        store,
        registry: Arc::new(SessionRegistry::new()),
        cache,
    }
}

fn basic_header(pair: &str) -> String {
    format!("Basic {}", BASE64.encode(pair))
}

#[test]
fn test_anonymous_request_renders_resource() {
    let h = harness();
    let req = MemRequest::new("/index.html");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert!(resp.status().is_none(), "plain success leaves status unset");
    assert_eq!(resp.content_type(), Some("text/plain"));
    assert_eq!(resp.body_string(), "welcome");
    assert!(h.gatehouse.sessions().is_empty(), "anonymous stores nothing");
}

#[test]
fn test_login_then_session_carries_identity_across_requests() {
    let h = harness();

    let first = MemRequest::with_registry("/whoami", Arc::clone(&h.registry))
        .header("authorization", basic_header("alice:secret"));
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&first, &mut resp);
    assert_eq!(resp.body_string(), "alice");

    let session = first.attached_session().expect("login created a session");
    let record = h
        .gatehouse
        .sessions()
        .get(session.id())
        .expect("identity stored");
    assert_eq!(record.user, "alice");

    // Same session, no credential header: the session tier resolves.
    let second = MemRequest::with_registry("/whoami", Arc::clone(&h.registry))
        .attach_session(h.registry.lookup(session.id()).expect("live"));
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&second, &mut resp);
    assert_eq!(resp.body_string(), "alice");
}

#[test]
fn test_denied_resource_gets_challenge_and_no_page() {
    let h = harness();
    let req = MemRequest::new("/private");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(401));
    assert!(resp.header("www-authenticate").is_some());
    assert!(resp.body().is_empty());
}

#[test]
fn test_authenticated_caller_reads_private_resource() {
    let h = harness();
    let req = MemRequest::new("/private")
        .header("authorization", basic_header("alice:secret"));
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.body_string(), "members only");
}

#[test]
fn test_rejected_credentials_get_challenge_only() {
    let h = harness();
    let req = MemRequest::new("/index.html")
        .header("authorization", basic_header("alice:wrong"));
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(401));
    assert!(resp.body().is_empty(), "no page alongside the challenge");
    assert!(h.gatehouse.sessions().is_empty());
}

#[test]
fn test_missing_resource_gets_styled_page_and_404() {
    let h = harness();
    let req = MemRequest::new("/missing");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(404));
    assert_eq!(resp.content_type(), Some("text/html"));
    assert!(resp.body_string().contains("/missing"));
}

#[test]
fn test_storage_trouble_maps_to_503() {
    let h = harness();
    let req = MemRequest::new("/flaky");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(503));
    assert!(resp.body_string().contains("storage offline"));
}

#[test]
fn test_render_failure_produces_error_page_without_status() {
    let h = harness();
    let req = MemRequest::new("/boom");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert!(resp.status().is_none());
    assert_eq!(resp.content_type(), Some("text/html"));
    assert!(resp.body_string().contains("template exploded"));
}

#[test]
fn test_unregistered_renderer_type_is_an_error_page() {
    let h = harness();
    let req = MemRequest::new("/odd");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert!(resp.body_string().contains("mystery"));
}

#[test]
fn test_renderer_identity_mutation_is_persisted() {
    let h = harness();
    let req = MemRequest::with_registry("/switch", Arc::clone(&h.registry))
        .header("authorization", basic_header("alice:secret"));
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.body_string(), "switched");
    let session = req.attached_session().expect("session created");
    let record = h.gatehouse.sessions().get(session.id()).expect("stored");
    assert_eq!(record.project, "offline", "render mutation persisted");
}

#[test]
fn test_failed_render_never_persists_the_mutation() {
    let h = harness();
    let session = h.registry.create();
    h.gatehouse
        .sessions()
        .put(session.id(), SessionRecord::new("bob", "editors", "live"));

    let req = MemRequest::with_registry("/boom", Arc::clone(&h.registry))
        .attach_session(session.clone());
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&req, &mut resp);

    let record = h.gatehouse.sessions().get(session.id()).expect("kept");
    assert_eq!(record.project, "live", "mutation was discarded");
    assert_eq!(record.group, "editors");
}

#[test]
fn test_flush_token_clears_registered_cache() {
    let h = harness();
    assert_eq!(h.cache.len(), 1);

    let req = MemRequest::new("/index.html").parameter("_flushcache", "all");
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&req, &mut resp);

    assert!(h.cache.is_empty(), "override token forced the clear");
    assert_eq!(resp.body_string(), "welcome", "request still succeeded");
}

#[test]
fn test_content_change_clears_stale_cache_once() {
    let h = harness();
    h.store.bump();

    let req = MemRequest::new("/index.html");
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&req, &mut resp);
    assert!(h.cache.is_empty(), "stale cache cleared on next request");

    // Refill; the same counter must not clear again.
    h.cache.insert("seed", "derived".to_string());
    let req = MemRequest::new("/index.html");
    let mut resp = MemResponse::new();
    h.gatehouse.handle(&req, &mut resp);
    assert_eq!(h.cache.len(), 1);
}

#[test]
fn test_error_page_write_failure_is_swallowed() {
    let h = harness();
    let req = MemRequest::new("/missing");
    let mut resp = MemResponse::failing();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(404), "status applied before the write");
    assert!(resp.body().is_empty());
}

#[test]
fn test_force_login_parameter_challenges_anonymous_caller() {
    let h = harness();
    let req = MemRequest::new("/index.html").parameter("gatehouse", "login");
    let mut resp = MemResponse::new();

    h.gatehouse.handle(&req, &mut resp);

    assert_eq!(resp.status(), Some(401));
    assert!(resp.header("www-authenticate").is_some());
    assert_eq!(resp.body_string(), "welcome", "page still renders");
}
