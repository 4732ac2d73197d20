//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, routes, health), and their
//! associated argument structs. Every `run` flag has an environment
//! variable equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};

#[derive(Parser)]
#[command(
    name = "storefront-gateway",
    version,
    about = "API proxy route layer for the art-marketplace storefront",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        storefront-gateway run                               Built-in routes, API at localhost:3001\n  \
        storefront-gateway run --api-url http://api:3001     Point at another upstream\n  \
        storefront-gateway init                              Write the built-in routes to gateway.yaml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway
    Run(Box<RunArgs>),

    /// Write the built-in route table to a file
    Init(InitArgs),

    /// Validate a routes file without starting
    Validate(ValidateArgs),

    /// Print the effective route table
    Routes(RoutesArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        storefront-gateway run                                  Auto-detect gateway.yaml, else built-in\n  \
        storefront-gateway run -r routes.yaml -p 8080 --pretty  Local dev mode\n  \
        API_URL=https://api.internal storefront-gateway run     Upstream from the environment")]
pub struct RunArgs {
    /// Upstream API base URL
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Routes file (.yaml, .json, .toml); built-in table when absent
    #[arg(short, long, env = "ROUTES_FILE")]
    pub routes: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENV", help_heading = "Observability")]
    pub sentry_env: Option<String>,

    /// Slack incoming-webhook URL for gateway error alerts
    #[arg(long, env = "SLACK_WEBHOOK_URL", help_heading = "Observability")]
    pub slack_webhook_url: Option<String>,

    /// Minimum seconds between two Slack alerts
    #[arg(
        long,
        env = "ALERT_INTERVAL_SECS",
        default_value_t = 60,
        help_heading = "Observability"
    )]
    pub alert_interval: u64,

    // -- Tuning --
    /// Upstream timeout in milliseconds (routes may override)
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        storefront-gateway init                          Built-in routes as gateway.yaml\n  \
        storefront-gateway init -f json -o routes.json   JSON output")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Routes file to validate
    #[arg(default_value = "gateway.yaml")]
    pub routes: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,

    /// Upstream timeout in milliseconds shown for routes without their own
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct RoutesArgs {
    /// Routes file; auto-detected or built-in when absent
    #[arg(short, long, env = "ROUTES_FILE")]
    pub routes: Option<PathBuf>,

    /// Upstream API base URL used to show full upstream URLs
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Upstream timeout in milliseconds, as passed to `run`
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "storefront-gateway",
            "run",
            "--api-url",
            "http://api:3001",
            "-p",
            "8080",
            "--timeout",
            "2500",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.api_url, "http://api:3001");
        assert_eq!(args.port, 8080);
        assert_eq!(args.timeout, 2500);
    }

    #[test]
    fn routes_takes_the_run_timeout() {
        let cli = Cli::try_parse_from(["storefront-gateway", "routes", "--timeout", "2500"]).unwrap();
        let Some(Commands::Routes(args)) = cli.command else {
            panic!("expected routes");
        };
        assert_eq!(args.timeout, 2500);
    }

    #[test]
    fn pretty_and_json_conflict() {
        assert!(Cli::try_parse_from(["storefront-gateway", "run", "--pretty", "--json"]).is_err());
    }
}
