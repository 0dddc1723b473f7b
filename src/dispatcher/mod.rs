//! # Dispatcher Module
//!
//! Turns an [`IncomingRequest`] into a [`HandlerResponse`].
//!
//! ## Request Flow
//!
//! 1. The router matches method and path to an endpoint (404 or 405 otherwise)
//! 2. Middleware `before` hooks run and may short-circuit
//! 3. Path, query and body inputs are validated against the endpoint's
//!    declared parameters
//! 4. On success the handler runs with the coerced arguments and its value is
//!    returned with status 200; on failure the handler never runs and a 422
//!    lists every field error
//! 5. Middleware `after` hooks see the final response
//!
//! Each request moves `Received → Validating → Dispatched | Rejected`; the
//! terminal state is returned in the [`Outcome`] and logged.
//!
//! ## Error Handling
//!
//! - A [`HandlerError`] becomes `{"detail": ...}` with the handler's status
//! - A panicking handler is caught and answered with 500
//!
//! Handlers run on the calling coroutine. The HTTP transport already gives
//! every connection its own coroutine, and validation does no blocking I/O.

mod core;

pub use core::{
    evaluate, handle, Dispatcher, HandlerError, HandlerFn, HandlerResponse, HeaderVec,
    IncomingRequest, Outcome, RequestState, MAX_INLINE_HEADERS, REQUEST_ID_HEADER,
};
