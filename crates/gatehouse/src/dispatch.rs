//! The per-request state machine.
//!
//! Stages run in a fixed order — resolve, locate, select, prepare, flush
//! stale caches, render, write, persist — and the first classified
//! failure short-circuits the rest and goes to the failure responder.
//! The identity resolved so far travels with the failure so the
//! responder can apply its detail policy.

use gatehouse_core::{Fault, Identity};
use gatehouse_render::RenderContext;
use gatehouse_session::{SessionRecord, ensure_removal_notice};
use gatehouse_transport::{Request, Response};

use crate::context::Gatehouse;
use crate::respond;

/// Runs one request through every stage. Infallible from the caller's
/// point of view: failures become responses, not results.
pub(crate) fn dispatch(
    gatehouse: &Gatehouse,
    request: &dyn Request,
    response: &mut dyn Response,
) {
    let mut identity = None;
    if let Err(fault) = run(gatehouse, request, response, &mut identity) {
        respond::respond(
            gatehouse.config(),
            identity.as_ref(),
            &fault,
            response,
        );
    }
}

fn run(
    gatehouse: &Gatehouse,
    request: &dyn Request,
    response: &mut dyn Response,
    resolved: &mut Option<Identity>,
) -> Result<(), Fault> {
    let mut identity = gatehouse.resolver().resolve(request, response)?;
    *resolved = Some(identity.clone());
    tracing::debug!(path = %request.path(), identity = %identity, "dispatching");

    let resource = gatehouse
        .resources()
        .locate(&identity, request.path())?;
    let renderer = gatehouse.renderers().get(&resource.type_key)?;
    renderer.prepare(&resource, response)?;

    gatehouse.caches().flush_stale(
        request.parameter(&gatehouse.config().flush_param),
        gatehouse.resources().change_counter(),
    );

    let payload = {
        let mut ctx = RenderContext {
            identity: &mut identity,
            caches: gatehouse.caches(),
        };
        renderer.render(&mut ctx, &resource)?
    };
    // The renderer may have switched group or project; keep the failure
    // path and the persisted record in step with it.
    *resolved = Some(identity.clone());

    response.write_body(&payload).map_err(|e| {
        Fault::generic("failed to write rendered payload").with_cause(e)
    })?;

    // Persist only after a successful render and write: a failed request
    // must not leave a half-mutated identity behind.
    if let Some(session) = request.session(false) {
        gatehouse
            .sessions()
            .put(session.id(), SessionRecord::from_identity(&identity));
        ensure_removal_notice(gatehouse.sessions(), &session);
    }

    tracing::debug!(
        path = %request.path(),
        bytes = payload.len(),
        "request completed"
    );
    Ok(())
}
