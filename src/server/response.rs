use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::error;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// `Allow: ...` header line with a static lifetime.
///
/// The transport only accepts `&'static str` header lines. Allow lists are
/// drawn from the registered methods, so the set of distinct lines is small
/// and each is leaked once.
fn allow_line(methods: &str) -> &'static str {
    static LINES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let line = format!("Allow: {methods}");
    let mut set = match LINES.get_or_init(|| Mutex::new(HashSet::new())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(existing) = set.get(line.as_str()) {
        return *existing;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    set.insert(leaked);
    leaked
}

/// Write a JSON body with the given status.
pub fn write_json(res: &mut Response, status: u16, body: &Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: application/json");
    match serde_json::to_vec(body) {
        Ok(bytes) => res.body_vec(bytes),
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            res.status_code(500, status_reason(500));
            res.body_vec(br#"{"detail":"Internal Server Error"}"#.to_vec());
        }
    }
}

/// Write a dispatcher response, including the `Allow` header on 405.
pub fn write_handler_response(res: &mut Response, resp: &HandlerResponse) {
    if let Some(allow) = resp.get_header("allow") {
        res.header(allow_line(allow));
    }
    write_json(res, resp.status, &resp.body);
}
