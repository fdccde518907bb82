//! CLI argument definitions
//!
//! All Clap derive structs for `leveldeck` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use leveldeck_core::UnknownFieldPolicy;

use crate::observability::LogFormat;
use crate::repository::CachePolicy;

// ============================================================================
// Root CLI
// ============================================================================

/// Validated tower-defense level configuration service.
#[derive(Parser, Debug)]
#[command(name = "leveldeck", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "LEVELDECK_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(
        long,
        default_value = "human",
        global = true,
        env = "LEVELDECK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve levels over HTTP.
    Serve(ServeArgs),

    /// Validate level documents without starting the server.
    Validate(ValidateArgs),

    /// List the level identifiers found in a directory.
    List(ListArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory holding one level document per file.
    #[arg(short, long, env = "LEVELDECK_LEVELS")]
    pub levels: PathBuf,

    /// Bind address, as `[host:]port`.
    #[arg(long, default_value = "127.0.0.1:8080", env = "LEVELDECK_HTTP")]
    pub http: String,

    /// Reuse validated levels while their stored bytes are unchanged.
    #[arg(long, default_value = "disabled", env = "LEVELDECK_CACHE")]
    pub cache: CachePolicy,

    /// Handling of fields the level schema does not declare.
    #[arg(long, default_value = "ignore", env = "LEVELDECK_UNKNOWN_FIELDS")]
    pub unknown_fields: UnknownFieldPolicy,

    /// Expose Prometheus metrics on `127.0.0.1:<PORT>`.
    #[arg(long, env = "LEVELDECK_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Level documents to validate (`.json`, `.yaml`, `.yml`).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Handling of fields the level schema does not declare.
    #[arg(long, default_value = "ignore")]
    pub unknown_fields: UnknownFieldPolicy,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory holding one level document per file.
    #[arg(short, long, env = "LEVELDECK_LEVELS")]
    pub levels: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
