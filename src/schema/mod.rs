//! # Schema Module
//!
//! Explicit endpoint declarations. Each endpoint registers a static list of
//! [`ParameterSpec`] entries at startup; the validator inspects that list at
//! request time instead of reflecting over handler signatures.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use paramgate::schema::{EndpointDescriptor, FieldSpec, ParameterSpec, SemanticType};
//! use serde_json::json;
//!
//! let descriptor = EndpointDescriptor::builder("read_item", Method::GET, "/items/{item_id}")
//!     .param(ParameterSpec::path(
//!         FieldSpec::new("item_id", SemanticType::Integer).gt(0.0),
//!     ))
//!     .param(ParameterSpec::query(
//!         FieldSpec::new("limit", SemanticType::Integer).default_value(json!(10)),
//!     ))
//!     .handler(|args| Ok(json!({ "item_id": args.get_i64("item_id") })))
//!     .expect("valid declaration");
//!
//! assert_eq!(descriptor.route_label(), "GET /items/{item_id}");
//! ```
//!
//! Declarations are linted when built: a template segment without a matching
//! path parameter, duplicate names, constraints that cannot apply to the
//! declared type and similar mistakes are all reported together in a
//! [`SchemaError`].

mod build;
mod template;
mod types;

pub use build::{EndpointBuilder, EndpointDescriptor, SchemaError, SchemaIssue};
pub use template::PathTemplate;
pub use types::{
    BodyLayout, Constraints, EnumSpec, FieldSpec, ModelSpec, ParameterSource, ParameterSpec,
    Presence, SemanticType,
};
