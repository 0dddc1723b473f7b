use std::time::Duration;

use crate::dispatcher::{HandlerResponse, IncomingRequest};
use crate::schema::EndpointDescriptor;

/// Hooks around dispatch of a matched request.
///
/// `before` may return a response to skip validation and the handler.
/// `after` runs for every matched request, including short-circuited ones.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &IncomingRequest, _endpoint: &EndpointDescriptor) -> Option<HandlerResponse> {
        None
    }
    fn after(
        &self,
        _req: &IncomingRequest,
        _endpoint: &EndpointDescriptor,
        _res: &mut HandlerResponse,
        _latency: Duration,
    ) {
    }
}
