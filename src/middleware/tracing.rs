use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerResponse, IncomingRequest};
use crate::schema::EndpointDescriptor;

/// Logs one line per matched request with its status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(
        &self,
        req: &IncomingRequest,
        endpoint: &EndpointDescriptor,
        res: &mut HandlerResponse,
        latency: Duration,
    ) {
        let latency_us = latency.as_micros();
        if res.status >= 500 {
            warn!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                endpoint = %endpoint.name,
                status = res.status,
                latency_us,
                "request"
            );
        } else {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                endpoint = %endpoint.name,
                status = res.status,
                latency_us,
                "request"
            );
        }
    }
}
