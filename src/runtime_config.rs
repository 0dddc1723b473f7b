//! # Runtime Configuration Module
//!
//! Service settings come from an optional YAML file and are then overridden
//! by environment variables.
//!
//! ```yaml
//! http:
//!   addr: "0.0.0.0:8080"
//!   max_body_bytes: 1048576
//!   stack_size: 0x10000
//! ```
//!
//! ## Environment Variables
//!
//! - `PARAMGATE_ADDR`: listen address
//! - `PARAMGATE_MAX_BODY_BYTES`: request body cap in bytes
//! - `PARAMGATE_STACK_SIZE`: coroutine stack size, decimal (`65536`) or
//!   hexadecimal (`0x10000`)
//!
//! Unparseable numeric variables are ignored with a warning and the file or
//! default value stays in effect.

use crate::server::DEFAULT_MAX_BODY_BYTES;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Parse a size given as decimal or `0x`-prefixed hexadecimal.
#[must_use]
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn de_size<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(usize),
        Text(String),
    }
    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        Size::Text(s) => parse_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid size '{s}'"))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub addr: String,
    #[serde(deserialize_with = "de_size")]
    pub max_body_bytes: usize,
    #[serde(deserialize_with = "de_size")]
    pub stack_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub http: HttpConfig,
}

impl ServiceConfig {
    /// Parse YAML text. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML, unknown keys or invalid sizes.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid service configuration")
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Apply `PARAMGATE_*` overrides from a variable source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("PARAMGATE_ADDR").filter(|s| !s.trim().is_empty()) {
            self.http.addr = addr.trim().to_string();
        }
        for (key, slot) in [
            ("PARAMGATE_MAX_BODY_BYTES", &mut self.http.max_body_bytes),
            ("PARAMGATE_STACK_SIZE", &mut self.http.stack_size),
        ] {
            if let Some(raw) = lookup(key) {
                match parse_size(&raw) {
                    Some(v) => *slot = v,
                    None => warn!(variable = key, value = %raw, "Ignoring unparseable size"),
                }
            }
        }
    }

    /// Load from an optional file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("65536"), Some(65536));
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size(" 0X10 "), Some(16));
        assert_eq!(parse_size("big"), None);
    }

    #[test]
    fn test_yaml_accepts_hex_strings() {
        let config = ServiceConfig::from_yaml_str(
            "http:\n  addr: \"0.0.0.0:9000\"\n  stack_size: \"0x8000\"\n",
        )
        .unwrap();
        assert_eq!(config.http.addr, "0.0.0.0:9000");
        assert_eq!(config.http.stack_size, 0x8000);
        assert_eq!(config.http.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ServiceConfig::from_yaml_str("http:\n  port: 1\n").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| match key {
            "PARAMGATE_ADDR" => Some("127.0.0.1:1".to_string()),
            "PARAMGATE_MAX_BODY_BYTES" => Some("nope".to_string()),
            "PARAMGATE_STACK_SIZE" => Some("0x20000".to_string()),
            _ => None,
        });
        assert_eq!(config.http.addr, "127.0.0.1:1");
        assert_eq!(config.http.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.http.stack_size, 0x20000);
    }
}
