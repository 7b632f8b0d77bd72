//! rbac-validator - RBAC rule coverage check over stdin/stdout
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`RBAC_VALIDATOR_*`)
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `RBAC_VALIDATOR_EXPLAIN`: Report uncovered rules (`true`/`false`)
//! - `RBAC_VALIDATOR_STRICT`: Reject malformed rules (`true`/`false`)
//! - `RBAC_VALIDATOR_PRETTY`: Pretty-print the verdict (`true`/`false`)
//! - `RBAC_VALIDATOR_LOG`: Log filter directive, e.g. `rbac_coverage=debug`
//! - `RBAC_VALIDATOR_LOG_FORMAT`: `text` or `json`
//!
//! Switches also take `yes`/`no`, `on`/`off` and `1`/`0` in any case. On the
//! command line `--strict` turns a switch on and `--strict=false` turns it
//! off, whatever the environment says.
//!
//! # Exit Status
//!
//! - `0`: a verdict was produced (`covers` may be true or false)
//! - `1`: the input was rejected or the verdict could not be written

use std::io;
use std::process::ExitCode;

use clap::Parser;
use rbac_validator::config::parse_switch;
use rbac_validator::{LogFormat, Validator, ValidatorConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Check that reference RBAC rules cover a set of requested rules.
///
/// Reads `{"userRules": [...], "referenceRules": [...]}` from stdin and
/// writes `{"covers": ...}` to stdout.
#[derive(Parser, Debug)]
#[command(name = "rbac-validator")]
#[command(version, about, long_about = None)]
struct Args {
    /// List uncovered rules in the verdict (overrides RBAC_VALIDATOR_EXPLAIN)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = switch
    )]
    explain: Option<bool>,

    /// Reject malformed rules instead of checking them (overrides RBAC_VALIDATOR_STRICT)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = switch
    )]
    strict: Option<bool>,

    /// Pretty-print the verdict (overrides RBAC_VALIDATOR_PRETTY)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = switch
    )]
    pretty: Option<bool>,

    /// Log filter directive for stderr (overrides RBAC_VALIDATOR_LOG)
    #[arg(long)]
    log_filter: Option<String>,

    /// Log format for stderr (overrides RBAC_VALIDATOR_LOG_FORMAT)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Layer the command-line flags over an environment configuration.
    fn apply(self, mut config: ValidatorConfig) -> ValidatorConfig {
        if let Some(explain) = self.explain {
            config.explain = explain;
        }
        if let Some(strict) = self.strict {
            config.strict = strict;
        }
        if let Some(pretty) = self.pretty {
            config.pretty = pretty;
        }
        if let Some(filter) = self.log_filter {
            config.log_filter = filter;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config
    }
}

fn switch(value: &str) -> Result<bool, String> {
    parse_switch(value).ok_or_else(|| format!("expected true or false, got {:?}", value))
}

fn init_tracing(config: &ValidatorConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|err| {
        eprintln!(
            "rbac-validator: invalid log filter {:?} ({}), using \"warn\"",
            config.log_filter, err
        );
        EnvFilter::new("warn")
    });
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(true);

    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.apply(ValidatorConfig::from_env());
    init_tracing(&config);

    let validator = Validator::new(config);
    match validator.run(io::stdin().lock(), io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.is_input_error() {
                eprintln!("{}", err);
            }
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str], env: ValidatorConfig) -> ValidatorConfig {
        let mut argv = vec!["rbac-validator"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap().apply(env)
    }

    fn all_on() -> ValidatorConfig {
        ValidatorConfig {
            explain: true,
            strict: true,
            pretty: true,
            ..ValidatorConfig::default()
        }
    }

    #[test]
    fn test_no_flags_keep_environment() {
        assert_eq!(config(&[], all_on()), all_on());
        assert_eq!(config(&[], ValidatorConfig::default()), ValidatorConfig::default());
    }

    #[test]
    fn test_bare_flags_turn_switches_on() {
        let config = config(
            &["--explain", "--strict", "--pretty"],
            ValidatorConfig::default(),
        );
        assert_eq!(config, all_on());
    }

    #[test]
    fn test_flags_turn_environment_switches_off() {
        let config = config(
            &["--explain=false", "--strict=off", "--pretty=NO"],
            all_on(),
        );
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn test_invalid_switch_value_is_a_usage_error() {
        assert!(Args::try_parse_from(["rbac-validator", "--strict=maybe"]).is_err());
    }

    #[test]
    fn test_log_flags_override_environment() {
        let env = ValidatorConfig {
            log_filter: "info".to_string(),
            ..ValidatorConfig::default()
        };
        let config = config(&["--log-filter", "debug", "--log-format", "json"], env);

        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
