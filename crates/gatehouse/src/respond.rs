//! Maps classified failures to client responses.
//!
//! One fixed table, keyed on [`FaultKind`]:
//!
//! - access denied → authentication challenge, 401
//! - not found → styled error page; 404 under the correct status policy,
//!   untouched status under the legacy one
//! - service unavailable → 503 with the failure description
//! - everything else → styled error page with no status change
//!
//! Writing an error page is best effort. A transport that cannot take
//! the page any more (client gone, stream closed) gets a debug log entry
//! and nothing else — the failure responder itself never fails.

use gatehouse_core::{Fault, FaultKind, Identity};
use gatehouse_session::send_challenge;
use gatehouse_transport::Response;

use crate::config::{DetailExposure, GatehouseConfig, NotFoundStatus};

pub(crate) fn respond(
    config: &GatehouseConfig,
    identity: Option<&Identity>,
    fault: &Fault,
    response: &mut dyn Response,
) {
    match fault.kind() {
        FaultKind::AccessDenied => {
            tracing::warn!(%fault, "access denied, challenging");
            send_challenge(response, &config.realm);
        }
        FaultKind::NotFound => {
            tracing::debug!(%fault, "resource not found");
            if config.not_found_status == NotFoundStatus::Correct {
                response.set_status(404);
            }
            response.set_content_type("text/html");
            let page = error_page("Not found", fault.message(), None);
            write_best_effort(response, page.as_bytes());
        }
        FaultKind::ServiceUnavailable => {
            tracing::warn!(%fault, "service unavailable");
            response.set_status(503);
            response.set_content_type("text/plain");
            write_best_effort(response, fault.to_string().as_bytes());
        }
        FaultKind::Generic => {
            tracing::error!(%fault, "request failed");
            response.set_content_type("text/html");
            let detail = cause_detail(config, identity, fault);
            let page =
                error_page("Error", fault.message(), detail.as_deref());
            write_best_effort(response, page.as_bytes());
        }
    }
}

/// The wrapped-cause text, when the exposure policy allows it for this
/// identity.
fn cause_detail(
    config: &GatehouseConfig,
    identity: Option<&Identity>,
    fault: &Fault,
) -> Option<String> {
    match config.detail_exposure {
        DetailExposure::Never => None,
        DetailExposure::NonAnonymous => match identity {
            Some(identity) if !identity.is_anonymous() => {
                fault.cause().map(|cause| cause.to_string())
            }
            _ => None,
        },
    }
}

/// Renders the inline error page.
fn error_page(title: &str, message: &str, detail: Option<&str>) -> String {
    let mut page = format!(
        "<!DOCTYPE html>\n\
         <html>\n<head>\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 4em auto; max-width: 40em; }}\n\
         h1 {{ font-size: 1.4em; border-bottom: 1px solid #ccc; }}\n\
         pre {{ background: #f4f4f4; padding: 1em; overflow-x: auto; }}\n\
         </style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p>{message}</p>\n",
        title = escape(title),
        message = escape(message),
    );
    if let Some(detail) = detail {
        page.push_str(&format!("<pre>{}</pre>\n", escape(detail)));
    }
    page.push_str("</body>\n</html>\n");
    page
}

/// Writes a body the client may no longer be around to read.
fn write_best_effort(response: &mut dyn Response, body: &[u8]) {
    if let Err(e) = response.write_body(body) {
        tracing::debug!(error = %e, "error page write failed, dropping");
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
