//! Request logging from `TracingMiddleware` and the dispatcher.

mod tracing_util;

use http::Method;
use paramgate::app::build_dispatcher;
use paramgate::dispatcher::{Dispatcher, IncomingRequest};
use paramgate::middleware::TracingMiddleware;
use paramgate::schema::EndpointDescriptor;
use std::sync::Arc;
use tracing_util::TestTracing;

#[test]
fn test_request_line_carries_status_and_request_id() {
    let tracing = TestTracing::init();
    let dispatcher = build_dispatcher().unwrap();
    let req = IncomingRequest::new(Method::GET, "/items/3")
        .with_header("X-Request-Id", "01ARZ3NDEKTSV4RRFFQ69G5FAV");
    let out = dispatcher.dispatch(&req);
    assert_eq!(out.response.status, 200);

    let lines = tracing.with_message("request");
    assert_eq!(lines.len(), 1);
    let fields = &lines[0]["fields"];
    assert_eq!(fields["request_id"], "01ARZ3NDEKTSV4RRFFQ69G5FAV");
    assert_eq!(fields["method"], "GET");
    assert_eq!(fields["path"], "/items/3");
    assert_eq!(fields["endpoint"], "read_item");
    assert_eq!(fields["status"], 200);
    assert!(!fields["latency_us"].is_null());
    assert_eq!(lines[0]["level"], "INFO");
}

#[test]
fn test_rejection_is_logged_with_error_count() {
    let tracing = TestTracing::init();
    let dispatcher = build_dispatcher().unwrap();
    let out = dispatcher.dispatch(&IncomingRequest::new(Method::GET, "/items/abc?my_bool=maybe"));
    assert_eq!(out.response.status, 422);

    let rejected = tracing.with_message("Request rejected by validation");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["fields"]["error_count"], 2);
    assert_eq!(rejected[0]["fields"]["state"], "rejected");

    let request = tracing.with_message("request");
    assert_eq!(request[0]["fields"]["status"], 422);
}

#[test]
fn test_server_errors_log_at_warn() {
    let tracing = TestTracing::init();
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(
        EndpointDescriptor::builder("boom", Method::GET, "/boom")
            .handler(|_| panic!("nope"))
            .unwrap(),
    );
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    let out = dispatcher.dispatch(&IncomingRequest::new(Method::GET, "/boom"));
    assert_eq!(out.response.status, 500);

    let lines = tracing.with_message("request");
    assert_eq!(lines[0]["level"], "WARN");
    let panics = tracing.with_message("Handler panicked");
    assert_eq!(panics[0]["fields"]["panic_message"], "nope");
}

#[test]
fn test_unmatched_requests_skip_middleware() {
    let tracing = TestTracing::init();
    let dispatcher = build_dispatcher().unwrap();
    let out = dispatcher.dispatch(&IncomingRequest::new(Method::GET, "/missing"));
    assert_eq!(out.response.status, 404);
    assert!(tracing.with_message("request").is_empty());
    assert_eq!(tracing.with_message("No route matched").len(), 2);
}
