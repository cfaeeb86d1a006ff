//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use crate::commands;
use manifest_install::output::OutputConfig;

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Manifest Install - Install git repositories described by a YAML manifest
#[derive(Parser, Debug)]
#[command(name = "manifest-install")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity and suppress progress output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the repositories of a manifest into the install directory
    Install(commands::install::InstallArgs),

    /// Validate a manifest without touching the install directory
    Validate(commands::validate::ValidateArgs),

    /// Print the default manifest of an install directory
    Show(commands::show::ShowArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = effective_level(&self.log_level, self.verbose, self.quiet)?;
        init_logging(level);

        let out = OutputConfig::from_env_and_flag(&self.color).with_quiet(self.quiet > 0);

        match self.command {
            Commands::Install(args) => commands::install::execute(args, &out),
            Commands::Validate(args) => commands::validate::execute(args, &out),
            Commands::Show(args) => commands::show::execute(args, &out),
        }
    }
}

/// Apply `-v`/`-q` counts to the `--log-level` value.
fn effective_level(log_level: &str, verbose: u8, quiet: u8) -> Result<LevelFilter> {
    let base: LevelFilter = log_level
        .parse()
        .with_context(|| format!("Invalid log level: {}", log_level))?;
    let index = (base as usize + verbose as usize).saturating_sub(quiet as usize);
    Ok(LEVELS[index.min(LEVELS.len() - 1)])
}

/// `RUST_LOG`, when set, takes precedence over the flags.
fn init_logging(level: LevelFilter) {
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
