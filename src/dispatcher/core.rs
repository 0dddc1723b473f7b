//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteResolution, Router};
use crate::schema::EndpointDescriptor;
use crate::validator::{validate_request, FieldError, ValidatedArgs};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage; names are lowercase.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request header carrying a caller-supplied correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Type-erased endpoint handler.
pub type HandlerFn = Arc<dyn Fn(ValidatedArgs) -> Result<Value, HandlerError> + Send + Sync>;

/// A request as seen by the dispatcher, independent of the transport.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Path without the query string, still percent-encoded
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl IncomingRequest {
    /// Build a request from a method and a request target such as
    /// `/items/5?limit=2`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            query: query.to_string(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a JSON body and the matching content type.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.to_string()));
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            self.request_id = RequestId::adopt_or_mint(Some(value));
        }
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the query string, keeping every occurrence in order.
    #[must_use]
    pub fn query_params(&self) -> ParamVec {
        url::form_urlencoded::parse(self.query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect()
    }
}

/// Response produced for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// `{"detail": ...}` error response.
    #[must_use]
    pub fn error(status: u16, detail: impl Into<Value>) -> Self {
        Self::json(status, json!({ "detail": detail.into() }))
    }

    /// 422 listing every field error.
    #[must_use]
    pub fn validation_failed(errors: &[FieldError]) -> Self {
        let detail = serde_json::to_value(errors).unwrap_or_else(|_| Value::Array(Vec::new()));
        Self::json(422, json!({ "detail": detail }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Failure raised by business logic after validation succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    pub status: u16,
    pub detail: Value,
}

impl HandlerError {
    pub fn new(status: u16, detail: impl Into<Value>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<Value>) -> Self {
        Self::new(404, detail)
    }

    pub fn bad_request(detail: impl Into<Value>) -> Self {
        Self::new(400, detail)
    }

    pub fn internal(detail: impl Into<Value>) -> Self {
        Self::new(500, detail)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Value::String(s) => write!(f, "{} {}", self.status, s),
            other => write!(f, "{} {}", self.status, other),
        }
    }
}

impl std::error::Error for HandlerError {}

/// Where a request ended up.
///
/// `Received` and `Validating` are transient; every request finishes as
/// either `Dispatched` (the handler ran) or `Rejected` (it never did).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validating,
    Dispatched,
    Rejected,
}

impl RequestState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Received => "received",
            RequestState::Validating => "validating",
            RequestState::Dispatched => "dispatched",
            RequestState::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Dispatched | RequestState::Rejected)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state plus the response to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: RequestState,
    pub response: HandlerResponse,
}

impl Outcome {
    fn rejected(response: HandlerResponse) -> Self {
        Self {
            state: RequestState::Rejected,
            response,
        }
    }
}

/// Validate a request against one descriptor and invoke its handler.
#[must_use]
pub fn handle(request: &IncomingRequest, descriptor: &EndpointDescriptor) -> HandlerResponse {
    evaluate(request, descriptor).response
}

/// Like [`handle`], but also reports the terminal state.
///
/// A path that does not fit the descriptor's template is rejected with 404.
#[must_use]
pub fn evaluate(request: &IncomingRequest, descriptor: &EndpointDescriptor) -> Outcome {
    let Some(path_params) = descriptor.path.extract(&request.path) else {
        debug!(
            request_id = %request.request_id,
            endpoint = %descriptor.name,
            path = %request.path,
            "Path does not fit endpoint template"
        );
        return Outcome::rejected(not_found());
    };
    evaluate_matched(request, descriptor, &path_params)
}

fn evaluate_matched(
    request: &IncomingRequest,
    descriptor: &EndpointDescriptor,
    path_params: &ParamVec,
) -> Outcome {
    let mut state = RequestState::Received;
    debug!(request_id = %request.request_id, endpoint = %descriptor.name, state = %state, "Request received");

    state = RequestState::Validating;
    let query_params = request.query_params();
    let body = (!request.body.is_empty()).then_some(request.body.as_slice());
    let args = match validate_request(descriptor, path_params, &query_params, body) {
        Ok(args) => args,
        Err(errors) => {
            info!(
                request_id = %request.request_id,
                endpoint = %descriptor.name,
                from = %state,
                state = %RequestState::Rejected,
                error_count = errors.len(),
                first_error = %errors.first().map(ToString::to_string).unwrap_or_default(),
                "Request rejected by validation"
            );
            return Outcome::rejected(HandlerResponse::validation_failed(&errors));
        }
    };

    let start = Instant::now();
    let handler = descriptor.handler();
    let result = catch_unwind(AssertUnwindSafe(|| handler(args)));
    let elapsed_us = start.elapsed().as_micros();

    let response = match result {
        Ok(Ok(body)) => HandlerResponse::json(200, body),
        Ok(Err(e)) => {
            warn!(
                request_id = %request.request_id,
                endpoint = %descriptor.name,
                status = e.status,
                error = %e,
                "Handler returned an error"
            );
            HandlerResponse::error(e.status, e.detail)
        }
        Err(panic) => {
            let panic_message = panic_message(panic.as_ref());
            error!(
                request_id = %request.request_id,
                endpoint = %descriptor.name,
                panic_message = %panic_message,
                "Handler panicked"
            );
            HandlerResponse::error(500, "Internal Server Error")
        }
    };

    info!(
        request_id = %request.request_id,
        endpoint = %descriptor.name,
        state = %RequestState::Dispatched,
        status = response.status,
        handler_us = elapsed_us,
        "Request dispatched"
    );
    Outcome {
        state: RequestState::Dispatched,
        response,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn not_found() -> HandlerResponse {
    HandlerResponse::error(404, "Not Found")
}

fn method_not_allowed(allowed: &[Method]) -> HandlerResponse {
    let mut resp = HandlerResponse::error(405, "Method Not Allowed");
    let list: Vec<&str> = allowed.iter().map(Method::as_str).collect();
    resp.set_header("allow", list.join(", "));
    resp
}

/// Routes requests to registered endpoints and runs middleware around them.
#[derive(Clone, Default)]
pub struct Dispatcher {
    pub router: Router,
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_router(router: Router) -> Self {
        Self {
            router,
            middlewares: Vec::new(),
        }
    }

    /// Register an endpoint, replacing any earlier one with the same method
    /// and template.
    pub fn register(&mut self, descriptor: EndpointDescriptor) {
        let endpoint = self.router.insert(descriptor);
        info!(
            handler_name = %endpoint.name,
            route = %endpoint.route_label(),
            total_handlers = self.router.endpoints().len(),
            "Handler registered successfully"
        );
    }

    /// Add middleware to the processing pipeline
    ///
    /// Middleware runs in the order it was added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Route, validate and dispatch one request.
    #[must_use]
    pub fn dispatch(&self, request: &IncomingRequest) -> Outcome {
        let route_match = match self.router.resolve(&request.method, &request.path) {
            RouteResolution::Matched(m) => m,
            RouteResolution::MethodNotAllowed { allowed } => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    "Method not allowed"
                );
                return Outcome::rejected(method_not_allowed(&allowed));
            }
            RouteResolution::NotFound => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    "No route matched"
                );
                return Outcome::rejected(not_found());
            }
        };
        let endpoint = route_match.endpoint.as_ref();

        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(request, endpoint);
                if early_resp.is_some() {
                    debug!(
                        request_id = %request.request_id,
                        middleware_idx = idx,
                        "Middleware returned early response"
                    );
                }
            } else {
                let _ = mw.before(request, endpoint);
            }
        }

        let start = Instant::now();
        let mut outcome = match early_resp {
            Some(resp) => Outcome::rejected(resp),
            None => evaluate_matched(request, endpoint, &route_match.path_params),
        };
        let latency: Duration = start.elapsed();

        for mw in &self.middlewares {
            mw.after(request, endpoint, &mut outcome.response, latency);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ParameterSpec, SemanticType};

    fn echo_endpoint() -> EndpointDescriptor {
        EndpointDescriptor::builder("read_item", Method::GET, "/items/{item_id}")
            .param(ParameterSpec::path(
                FieldSpec::new("item_id", SemanticType::Integer).gt(0.0),
            ))
            .handler(|args| Ok(json!({ "item_id": args.get_i64("item_id") })))
            .unwrap()
    }

    #[test]
    fn test_request_target_split() {
        let req = IncomingRequest::new(Method::GET, "/items/5?limit=2&limit=3");
        assert_eq!(req.path, "/items/5");
        assert_eq!(req.query, "limit=2&limit=3");
        let q = req.query_params();
        assert_eq!(q.len(), 2);
        assert_eq!(q[1].1, "3");
    }

    #[test]
    fn test_handle_success_and_rejection() {
        let endpoint = echo_endpoint();
        let ok = evaluate(&IncomingRequest::new(Method::GET, "/items/5"), &endpoint);
        assert_eq!(ok.state, RequestState::Dispatched);
        assert_eq!(ok.response.body, json!({ "item_id": 5 }));

        let bad = evaluate(&IncomingRequest::new(Method::GET, "/items/-1"), &endpoint);
        assert_eq!(bad.state, RequestState::Rejected);
        assert_eq!(bad.response.status, 422);
        assert_eq!(bad.response.body["detail"][0]["type"], "greater_than");
    }

    #[test]
    fn test_path_outside_template_is_not_found() {
        let resp = handle(&IncomingRequest::new(Method::GET, "/other"), &echo_endpoint());
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, json!({ "detail": "Not Found" }));
    }

    #[test]
    fn test_request_id_header_is_adopted() {
        let id = RequestId::new();
        let req = IncomingRequest::new(Method::GET, "/").with_header("X-Request-Id", &id.to_string());
        assert_eq!(req.request_id, id);
        assert_eq!(req.get_header("x-request-id"), Some(id.to_string().as_str()));
    }

    #[test]
    fn test_state_terminality() {
        assert!(!RequestState::Received.is_terminal());
        assert!(!RequestState::Validating.is_terminal());
        assert!(RequestState::Dispatched.is_terminal());
        assert!(RequestState::Rejected.is_terminal());
    }
}
