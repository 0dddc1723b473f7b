//! # CLI Module
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! paramgate serve --config paramgate.yaml --addr 0.0.0.0:8080
//! ```
//!
//! Loads the configuration, applies `PARAMGATE_*` overrides, then serves the
//! tutorial endpoints until the process is stopped.
//!
//! ### `routes`
//!
//! Lists every endpoint with its declared parameters.
//!
//! ### `call`
//!
//! ```bash
//! paramgate call GET "/items/5?my_bool=yes"
//! paramgate call PUT /items/5 --body '{"item":{"name":"x","price":1},"user":{"usename":"u"},"importance":1}'
//! ```
//!
//! Runs one request through routing, validation and the handler in-process
//! and prints the status, terminal state and JSON body.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_call_request, execute, print_routes, run_cli, Cli, Commands};
