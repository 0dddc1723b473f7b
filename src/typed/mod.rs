//! # Typed Module
//!
//! Lets handlers work with structs instead of the raw argument map.
//!
//! ```rust
//! use http::Method;
//! use paramgate::dispatcher::HandlerError;
//! use paramgate::schema::{EndpointDescriptor, FieldSpec, ParameterSpec, SemanticType};
//! use paramgate::typed::Handler;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct ReadItem {
//!     item_id: i64,
//! }
//! paramgate::impl_from_args!(ReadItem);
//!
//! #[derive(Serialize)]
//! struct ItemOut {
//!     item_id: i64,
//! }
//!
//! struct ReadItemHandler;
//!
//! impl Handler for ReadItemHandler {
//!     type Request = ReadItem;
//!     type Response = ItemOut;
//!
//!     fn handle(&self, req: ReadItem) -> Result<ItemOut, HandlerError> {
//!         Ok(ItemOut { item_id: req.item_id })
//!     }
//! }
//!
//! let endpoint = EndpointDescriptor::builder("read_item", Method::GET, "/items/{item_id}")
//!     .param(ParameterSpec::path(FieldSpec::new("item_id", SemanticType::Integer)))
//!     .typed(ReadItemHandler)
//!     .unwrap();
//! assert_eq!(endpoint.name, "read_item");
//! ```

mod core;

pub use core::{into_handler_fn, Handler};
