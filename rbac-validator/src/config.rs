//! Validator configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! keep the output identical to the plain `{"covers": ...}` contract.
//! Command-line flags override the environment.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a log format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Parse a boolean switch value (case-insensitive).
///
/// Accepts `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`.
pub fn parse_switch(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Include the uncovered rules in the verdict.
    pub explain: bool,

    /// Reject malformed rules instead of checking them structurally.
    pub strict: bool,

    /// Pretty-print the verdict.
    pub pretty: bool,

    /// `tracing` filter directive for stderr logs.
    pub log_filter: String,

    /// Format of stderr logs.
    pub log_format: LogFormat,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            explain: false,
            strict: false,
            pretty: false,
            log_filter: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_VALIDATOR_EXPLAIN`: Report uncovered rules (default: false)
    /// - `RBAC_VALIDATOR_STRICT`: Reject malformed rules (default: false)
    /// - `RBAC_VALIDATOR_PRETTY`: Pretty-print the verdict (default: false)
    /// - `RBAC_VALIDATOR_LOG`: Log filter directive (default: warn)
    /// - `RBAC_VALIDATOR_LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Switch variables follow [`parse_switch`]. An empty value is off and
    /// any other unrecognized value is on.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|s| parse_switch(&s).unwrap_or_else(|| !s.trim().is_empty()))
                .unwrap_or(default)
        };

        Self {
            explain: flag("RBAC_VALIDATOR_EXPLAIN", default.explain),
            strict: flag("RBAC_VALIDATOR_STRICT", default.strict),
            pretty: flag("RBAC_VALIDATOR_PRETTY", default.pretty),
            log_filter: lookup("RBAC_VALIDATOR_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default.log_filter),
            log_format: lookup("RBAC_VALIDATOR_LOG_FORMAT")
                .and_then(|s| LogFormat::parse(&s))
                .unwrap_or(default.log_format),
        }
    }
}
