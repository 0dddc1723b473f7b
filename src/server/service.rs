use super::request::parse_request;
use super::response::{write_handler_response, write_json};
use crate::dispatcher::Dispatcher;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;

/// Default request body cap.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// `HttpService` adapter: parses the request, dispatches it and writes the
/// JSON response.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let incoming = match parse_request(req, self.max_body_bytes) {
            Ok(r) => r,
            Err(rejection) => {
                write_json(res, rejection.status(), &json!({ "detail": rejection.detail() }));
                return Ok(());
            }
        };

        let outcome = self.dispatcher.dispatch(&incoming);
        write_handler_response(res, &outcome.response);
        Ok(())
    }
}
