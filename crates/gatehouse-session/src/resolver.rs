//! The three-tier identity resolution decision.
//!
//! Ordered, first match wins:
//!
//! 1. session hit in the [`SessionStore`] → stored identity, verbatim
//! 2. Basic credential header → verify against the backend, create the
//!    session, store the record
//! 3. neither → anonymous
//!
//! A force-login parameter lets a page demand the browser's credential
//! prompt without failing the request. Resolution itself never fails —
//! the fallback is always anonymous — but a failure raised by the
//! credential backend propagates.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use gatehouse_core::{Fault, FaultKind, Identity};
use gatehouse_transport::{Request, Response, Session};

use crate::store::{SessionRecord, SessionStore};
use crate::verify::CredentialVerifier;

/// Query parameter that forces an authentication challenge.
pub const FORCE_LOGIN_PARAM: &str = "gatehouse";

/// Value of [`FORCE_LOGIN_PARAM`] that triggers the challenge.
pub const FORCE_LOGIN_VALUE: &str = "login";

/// Header carrying Basic credentials.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// What to do when the backend rejects presented credentials.
///
/// The original front door sent the challenge and then kept dispatching
/// as anonymous — a request with wrong credentials still produced a page.
/// Aborting with the challenge as the sole response is the safer default;
/// the legacy mode exists for installations that depend on the old flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadCredentialPolicy {
    /// Abort resolution: the access-denied fault propagates and the
    /// challenge is the whole response.
    #[default]
    Abort,

    /// Send the challenge, then continue the request as anonymous.
    ContinueAnonymous,
}

/// Resolves each request to an [`Identity`].
pub struct IdentityResolver {
    store: Arc<SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    realm: String,
    bad_credentials: BadCredentialPolicy,
}

impl IdentityResolver {
    /// Builds a resolver over the shared store and the identity backend.
    pub fn new(
        store: Arc<SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        realm: impl Into<String>,
        bad_credentials: BadCredentialPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            realm: realm.into(),
            bad_credentials,
        }
    }

    /// The shared session store this resolver reads and writes.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Runs the ordered decision for one request.
    ///
    /// # Errors
    ///
    /// Only failures raised by the credential backend propagate:
    /// access-denied under [`BadCredentialPolicy::Abort`], and every other
    /// kind unconditionally. All other paths produce an identity.
    pub fn resolve(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
    ) -> Result<Identity, Fault> {
        let credentials = decode_basic(request.header(AUTHORIZATION_HEADER));

        // Tier 0: a page demanded the login prompt. The challenge alone
        // does not finish resolution — a stored session can still win.
        if request.parameter(FORCE_LOGIN_PARAM) == Some(FORCE_LOGIN_VALUE)
            && credentials.is_none()
        {
            send_challenge(response, &self.realm);
        }

        // Tier 1: session hit. Takes precedence over any credential
        // header on the same request.
        if let Some(session) = request.session(false) {
            if let Some(record) = self.store.get(session.id()) {
                tracing::debug!(
                    session_id = %session.id(),
                    user = %record.user,
                    "resolved identity from session"
                );
                return Ok(record.identity());
            }
        }

        // Tier 2: Basic credentials.
        if let Some((username, password)) = credentials {
            return match self.verifier.verify(&username, &password) {
                Ok(verified) => {
                    let session = request.session(true).ok_or_else(|| {
                        Fault::generic(
                            "transport refused to create a session",
                        )
                    })?;
                    let identity = Identity::authenticated(verified.user);
                    self.store.put(
                        session.id(),
                        SessionRecord::from_identity(&identity),
                    );
                    ensure_removal_notice(&self.store, &session);
                    tracing::info!(
                        session_id = %session.id(),
                        user = %identity.user,
                        "credential login succeeded"
                    );
                    Ok(identity)
                }
                Err(fault) if fault.kind() == FaultKind::AccessDenied => {
                    tracing::info!(
                        user = %username,
                        "credential verification rejected"
                    );
                    match self.bad_credentials {
                        BadCredentialPolicy::Abort => Err(fault),
                        BadCredentialPolicy::ContinueAnonymous => {
                            send_challenge(response, &self.realm);
                            Ok(Identity::anonymous())
                        }
                    }
                }
                Err(fault) => Err(fault),
            };
        }

        // Tier 3: nobody.
        Ok(Identity::anonymous())
    }
}

/// Emits the Basic authentication challenge: header plus 401.
pub fn send_challenge(response: &mut dyn Response, realm: &str) {
    response.set_header(
        "WWW-Authenticate",
        &format!("Basic realm=\"{realm}\""),
    );
    response.set_status(401);
}

/// Hangs the store-removal notice on a transport session, once.
///
/// Registration is keyed on the session itself, so repeated requests on
/// one session register exactly one notice; when the session dies, the
/// store entry goes with it.
pub fn ensure_removal_notice(store: &Arc<SessionStore>, session: &Session) {
    if session.has_on_destroy() {
        return;
    }
    let store = Arc::clone(store);
    session.register_on_destroy(Box::new(move |session_id| {
        store.remove(session_id);
        tracing::debug!(%session_id, "session record removed on destruction");
    }));
}

/// Decodes a Basic credential header into (username, password).
///
/// Anything malformed — wrong scheme, bad base64, non-UTF-8 payload, no
/// `:` delimiter — counts as "no credentials present". The split is on
/// the first `:`, so passwords may contain colons.
fn decode_basic(header: Option<&str>) -> Option<(String, String)> {
    let value = header?.trim();
    let (scheme, payload) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(payload.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
