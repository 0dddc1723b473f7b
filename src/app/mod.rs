//! The tutorial application: a greeting, item creation, model lookup by
//! enum, item reads with query validation, and item updates with several
//! body parameters.

pub mod handlers;
pub mod models;
mod registry;

pub use registry::{build_dispatcher, build_endpoints};
