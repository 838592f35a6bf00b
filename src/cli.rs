// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `lemonfeed`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lemonfeed",
    version,
    about = "Feed the output of small status commands into lemonbar.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `$XDG_CONFIG_HOME/lemonfeed/lemonfeed.toml`.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<String>,

    /// Run the bar even if the format string names no blocks.
    #[arg(long, short = 'e')]
    pub empty: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LEMONFEED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the bar command and blocks, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
