use crate::app::build_dispatcher;
use crate::dispatcher::{Dispatcher, IncomingRequest};
use crate::runtime_config::ServiceConfig;
use crate::schema::{ParameterSpec, Presence};
use crate::server::{AppService, HttpServer};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for paramgate
#[derive(Parser, Debug)]
#[command(name = "paramgate")]
#[command(about = "Schema-validated JSON endpoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// YAML configuration file
        #[arg(short, long, env = "PARAMGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Address and port to bind, overriding the configuration
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the registered endpoints and their parameters
    Routes,
    /// Run one request through validation and dispatch without a server
    Call {
        /// HTTP method, e.g. GET
        method: String,

        /// Request target, e.g. "/items/5?limit=2"
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Extra header as `name: value`; may be repeated
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

fn describe_param(param: &ParameterSpec) -> String {
    let field = &param.field;
    let mut out = format!("{}.{}: {}", param.source.loc_root(), field.name, field.ty.type_name());
    match &field.presence {
        Presence::Required => out.push_str(" (required)"),
        Presence::Default(v) => {
            out.push_str(" = ");
            out.push_str(&v.to_string());
        }
        Presence::Optional => out.push_str(" = null"),
    }
    out
}

/// Write the route listing.
///
/// # Errors
///
/// Fails if writing to `out` fails.
pub fn print_routes(dispatcher: &Dispatcher, out: &mut impl Write) -> io::Result<()> {
    for endpoint in dispatcher.router.endpoints() {
        writeln!(out, "{:<28} {}", endpoint.route_label(), endpoint.name)?;
        for param in &endpoint.params {
            writeln!(out, "    {}", describe_param(param))?;
        }
    }
    Ok(())
}

/// Build the in-process request for `call`.
///
/// # Errors
///
/// Fails on an unknown method, a malformed header or a body that is not JSON.
pub fn build_call_request(
    method: &str,
    path: &str,
    body: Option<&str>,
    headers: &[String],
) -> Result<IncomingRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method '{method}'"))?;
    let mut request = IncomingRequest::new(method, path);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("header '{header}' is not in 'name: value' form"))?;
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(body) = body {
        let value: serde_json::Value =
            serde_json::from_str(body).context("--body is not valid JSON")?;
        request = request.with_json(&value);
    }
    Ok(request)
}

fn serve(config: Option<PathBuf>, addr: Option<String>) -> Result<()> {
    let mut config = ServiceConfig::load(config.as_deref())?;
    if let Some(addr) = addr {
        config.http.addr = addr;
    }
    may::config().set_stack_size(config.http.stack_size);

    let dispatcher = Arc::new(build_dispatcher()?);
    let service = AppService::new(dispatcher).with_max_body_bytes(config.http.max_body_bytes);
    let handle = HttpServer(service)
        .start(config.http.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.http.addr))?;
    info!(
        addr = %handle.addr(),
        stack_size = config.http.stack_size,
        max_body_bytes = config.http.max_body_bytes,
        "Server listening"
    );
    handle
        .join()
        .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
}

/// Execute a parsed command, writing any output to `out`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the server fails
/// to start, or a `call` request cannot be built.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Serve { config, addr } => serve(config, addr),
        Commands::Routes => {
            let dispatcher = build_dispatcher()?;
            print_routes(&dispatcher, out)?;
            Ok(())
        }
        Commands::Call {
            method,
            path,
            body,
            headers,
        } => {
            let dispatcher = build_dispatcher()?;
            let request = build_call_request(&method, &path, body.as_deref(), &headers)?;
            let outcome = dispatcher.dispatch(&request);
            writeln!(out, "{} ({})", outcome.response.status, outcome.state)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&outcome.response.body)?)?;
            Ok(())
        }
    }
}

/// Parse the process arguments and run the command.
///
/// # Errors
///
/// See [`execute`].
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    execute(cli, &mut lock)
}
