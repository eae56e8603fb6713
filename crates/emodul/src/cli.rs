//! Clap derive structures for the `emodul` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// emodul -- drive a TECH eModul heating thermostat from the command line
#[derive(Debug, Parser)]
#[command(
    name = "emodul",
    version,
    about = "Read and control a TECH eModul heating thermostat",
    long_about = "Talks to the eModul cloud backend on behalf of a single room thermostat.\n\n\
        Credentials and device encoding come from the config file and\n\
        EMODUL_* environment variables (e.g. EMODUL_USERNAME, EMODUL_PASSWORD).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'C', env = "EMODUL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the thermostat and print every state change until Ctrl-C
    Run,

    /// Read the thermostat once and print its state
    Status,

    /// Set the target temperature in °C
    Set(SetArgs),

    /// Switch heating off (writes the off threshold)
    Off,

    /// Switch heating on (restores the last heating target)
    Heat,

    /// Print the effective configuration (password masked)
    Config,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Target temperature; clamped to the device range and step
    #[arg(allow_negative_numbers = true)]
    pub celsius: f64,
}
