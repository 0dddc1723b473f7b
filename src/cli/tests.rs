//! Unit tests for CLI commands

use crate::cli::{build_call_request, execute, Cli, Commands};
use clap::Parser;

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["paramgate", "serve"],
        vec!["paramgate", "serve", "--config", "p.yaml", "--addr", "0.0.0.0:9"],
        vec!["paramgate", "routes"],
        vec!["paramgate", "call", "GET", "/"],
        vec!["paramgate", "call", "POST", "/items/", "--body", "{}", "-H", "x-a: 1"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {args:?}");
    }
}

#[test]
fn test_call_command_fields() {
    let cli = Cli::try_parse_from(["paramgate", "call", "get", "/models/alexnet"]).unwrap();
    match cli.command {
        Commands::Call { method, path, body, headers } => {
            assert_eq!(method, "get");
            assert_eq!(path, "/models/alexnet");
            assert!(body.is_none());
            assert!(headers.is_empty());
        }
        other => panic!("Expected Call command, got {other:?}"),
    }
}

#[test]
fn test_call_request_rejects_bad_input() {
    assert!(build_call_request("GET", "/", Some("{nope"), &[]).is_err());
    assert!(build_call_request("GET", "/", None, &["no-colon".to_string()]).is_err());
    let req = build_call_request("post", "/items/?a=1", Some("{}"), &["X-Trace: t".to_string()]).unwrap();
    assert_eq!(req.method, http::Method::POST);
    assert_eq!(req.query, "a=1");
    assert_eq!(req.get_header("x-trace"), Some("t"));
    assert_eq!(req.get_header("content-type"), Some("application/json"));
}

#[test]
fn test_routes_output_lists_parameters() {
    let cli = Cli::try_parse_from(["paramgate", "routes"]).unwrap();
    let mut out = Vec::new();
    execute(cli, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("GET /items/{item_id}"));
    assert!(text.contains("query.limit: integer = 10"));
    assert!(text.contains("path.model_name: enum ModelName (required)"));
}

#[test]
fn test_call_output_reports_state() {
    let cli = Cli::try_parse_from(["paramgate", "call", "GET", "/items/abc"]).unwrap();
    let mut out = Vec::new();
    execute(cli, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("422 (rejected)"));
    assert!(text.contains("int_parsing"));
}
