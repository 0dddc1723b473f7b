//! # Router Module
//!
//! Matches an incoming method and path to a registered
//! [`EndpointDescriptor`](crate::schema::EndpointDescriptor).
//!
//! ## Architecture
//!
//! 1. **Compilation**: each endpoint's template (e.g. `/items/{item_id}`) is
//!    compiled to an anchored regex when the descriptor is built.
//!
//! 2. **Matching**: the router tests the request path against the templates
//!    in registration order. A path that only matches under other methods
//!    resolves to [`RouteResolution::MethodNotAllowed`] so the caller can
//!    answer 405 with an `Allow` header instead of 404.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use paramgate::router::Router;
//! use paramgate::schema::EndpointDescriptor;
//! use serde_json::json;
//!
//! let root = EndpointDescriptor::builder("root", Method::GET, "/")
//!     .handler(|_| Ok(json!({ "message": "Hello World" })))
//!     .unwrap();
//! let router = Router::from_endpoints([root]);
//!
//! let m = router.route(&Method::GET, "/").unwrap();
//! assert_eq!(m.endpoint.name, "root");
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, RouteResolution, Router, MAX_INLINE_PARAMS};
