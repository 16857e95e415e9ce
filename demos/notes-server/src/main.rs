//! A small notes site behind the Gatehouse front door.
//!
//! Public notes live under `/notes/`, drafts under `/drafts/` and are
//! only visible to a logged-in caller (try alice:secret). Rendered pages
//! are memoized in a cache that the front door clears whenever a note
//! changes — POSTing is out of scope, but `?_flushcache=page` shows the
//! override path.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gatehouse::prelude::*;
use parking_lot::RwLock;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

struct Note {
    title: String,
    body: String,
    draft: bool,
}

/// In-memory note storage with a change counter.
struct NotesStore {
    notes: RwLock<HashMap<String, Note>>,
    counter: AtomicU64,
}

impl NotesStore {
    fn seeded() -> Self {
        let mut notes = HashMap::new();
        notes.insert(
            "/notes/welcome".to_string(),
            Note {
                title: "Welcome".to_string(),
                body: "This site is served through Gatehouse.".to_string(),
                draft: false,
            },
        );
        notes.insert(
            "/drafts/roadmap".to_string(),
            Note {
                title: "Roadmap".to_string(),
                body: "Ship the demo.".to_string(),
                draft: true,
            },
        );
        Self {
            notes: RwLock::new(notes),
            counter: AtomicU64::new(0),
        }
    }
}

impl ResourceStore for NotesStore {
    fn locate(
        &self,
        identity: &Identity,
        path: &str,
    ) -> Result<Resource, Fault> {
        let notes = self.notes.read();
        let note = notes
            .get(path)
            .ok_or_else(|| Fault::not_found(format!("no note at {path}")))?;
        if note.draft && identity.is_anonymous() {
            return Err(Fault::access_denied(format!(
                "{path} is a draft, log in to read it"
            )));
        }
        Ok(Resource {
            path: path.to_string(),
            type_key: "page".to_string(),
            content_type: "text/html".to_string(),
            data: format!("{}\n{}", note.title, note.body).into_bytes(),
        })
    }

    fn change_counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Wraps a note in a page shell, memoizing rendered pages. The cache is
/// also registered with the front door, which clears it on staleness.
struct PageRenderer {
    rendered: Arc<ContentCache<Vec<u8>>>,
}

impl Renderer for PageRenderer {
    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        resource: &Resource,
    ) -> Result<Vec<u8>, Fault> {
        if let Some(page) = self.rendered.get(&resource.path) {
            return Ok(page);
        }

        let text = String::from_utf8_lossy(&resource.data);
        let (title, body) = text.split_once('\n').unwrap_or((&text, ""));
        let page = format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n<p>{body}</p>\n\
             <p><em>viewed as {user}</em></p>\n</body>\n</html>\n",
            user = ctx.identity.user,
        )
        .into_bytes();
        self.rendered.insert(resource.path.clone(), page.clone());
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A fixed user list. A real deployment would call its user backend.
struct TeamVerifier {
    accounts: HashMap<&'static str, &'static str>,
}

impl TeamVerifier {
    fn new() -> Self {
        let accounts =
            HashMap::from([("alice", "secret"), ("bob", "hunter2")]);
        Self { accounts }
    }
}

impl CredentialVerifier for TeamVerifier {
    fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<VerifiedUser, Fault> {
        match self.accounts.get(username) {
            Some(expected) if *expected == password => {
                Ok(VerifiedUser::new(username))
            }
            _ => Err(Fault::access_denied("unknown user or wrong password")),
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), GatehouseError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_default();
    fmt().with_env_filter(filter).init();

    let addr = std::env::var("NOTES_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let rendered: Arc<ContentCache<Vec<u8>>> = Arc::new(ContentCache::new());
    let gatehouse = Gatehouse::builder(
        Arc::new(NotesStore::seeded()) as Arc<dyn ResourceStore>,
        Arc::new(TeamVerifier::new()),
    )
    .config(GatehouseConfig {
        realm: "Notes".to_string(),
        ..GatehouseConfig::default()
    })
    .cache("page", Arc::clone(&rendered) as Arc<dyn FlushTarget>)
    .renderer("page", Arc::new(PageRenderer { rendered }))
    .build();

    info!(%addr, "starting notes server");
    let server = GatehouseServer::builder()
        .bind(&addr)
        .build(Arc::new(gatehouse))
        .await?;
    server.run().await
}
