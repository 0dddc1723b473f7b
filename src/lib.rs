//! # paramgate
//!
//! **paramgate** validates HTTP requests against declared endpoint schemas and
//! dispatches them to handlers on the `may` coroutine runtime.
//!
//! ## Overview
//!
//! Each endpoint is declared once as an [`schema::EndpointDescriptor`]: a
//! method, a path template with `{name}` segments, and a list of parameters
//! drawn from the path, the query string or the JSON body. Incoming requests
//! are routed, their raw inputs are coerced and checked against those
//! declarations, and only fully valid arguments ever reach a handler. Any
//! failure produces a single `422` response listing every problem found.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Semantic types, constraints, parameters and endpoint declarations
//! - **[`router`]** - Path template matching in registration order
//! - **[`validator`]** - Coercion, constraint checks and structured error reports
//! - **[`dispatcher`]** - Request lifecycle, handler invocation and error mapping
//! - **[`typed`]** - Strongly typed handler trait on top of validated arguments
//! - **[`middleware`]** - Before/after hooks around dispatch (request logging)
//! - **[`server`]** - HTTP service built on `may_minihttp`
//! - **[`app`]** - The tutorial endpoints and their models
//! - **[`cli`]** - `serve`, `routes` and `call` commands
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService<br/>(may_minihttp)
//!     participant Router
//!     participant Validator
//!     participant Handler
//!
//!     Client->>Server: GET /items/5?skip=1
//!     Server->>Server: Read body (size limited)
//!     Server->>Router: resolve(GET, "/items/5")
//!     alt No template matches
//!         Router-->>Client: 404 {"detail":"Not Found"}
//!     else Template matches another method
//!         Router-->>Client: 405 + Allow
//!     end
//!     Router-->>Server: RouteMatch {item_id: "5"}
//!     Server->>Validator: path, query, body
//!     alt Any parameter invalid
//!         Validator-->>Client: 422 {"detail":[...]}
//!     end
//!     Validator-->>Server: ValidatedArgs
//!     Server->>Handler: handle(args)
//!     Handler-->>Client: 200 + JSON
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use paramgate::app::build_dispatcher;
//! use paramgate::dispatcher::IncomingRequest;
//! use http::Method;
//!
//! let dispatcher = build_dispatcher().unwrap();
//! let outcome = dispatcher.dispatch(&IncomingRequest::new(Method::GET, "/models/lenet"));
//! assert_eq!(outcome.response.status, 200);
//! assert_eq!(outcome.response.body["model_name"], "lenet");
//! ```
//!
//! ## Runtime Considerations
//!
//! paramgate uses the `may` coroutine runtime, not tokio:
//!
//! - Requests are served on coroutines; handlers run on the serving coroutine
//! - Coroutine stack size comes from `http.stack_size` or `PARAMGATE_STACK_SIZE`
//! - Handlers should avoid blocking calls that `may` cannot yield on

pub mod app;
pub mod cli;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod typed;
pub mod validator;

pub use dispatcher::{Dispatcher, HandlerError, HandlerResponse, IncomingRequest, Outcome};
pub use router::Router;
pub use schema::{EndpointDescriptor, FieldSpec, ModelSpec, ParameterSpec, SemanticType};
pub use validator::{validate_request, FieldError, ValidatedArgs};
