//! HTTP transport built on `may_minihttp`.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, read_body_limited, split_target, RequestRejection};
pub use service::{AppService, DEFAULT_MAX_BODY_BYTES};
