//! Hooks that run around dispatch of a matched request.

mod core;
mod tracing;

pub use core::Middleware;
pub use tracing::TracingMiddleware;
