//! Binary entry point for cousins.
//!
//! This binary provides the CLI interface for managing cousin rules and
//! running them over exported note files.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{OutputFormat, RulesAction, cmd_config, cmd_dupes, cmd_rules, cmd_suppress};
use cousins::config::CousinsConfig;
use cousins::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// Cousins - fuzzy sibling matching for flashcard notes.
#[derive(Parser)]
#[command(name = "cousins")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "COUSINS_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Manage the stored cousin rules.
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Report groups of duplicate notes.
    Dupes {
        /// Note export (`.csv` or `.json`).
        #[arg(short, long)]
        notes: PathBuf,

        /// Only run rules whose source field has this name.
        #[arg(long)]
        field: Option<String>,

        /// Also report notes whose field values are identical once markup is
        /// stripped. The comparison is case sensitive.
        #[arg(long)]
        exact: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List the cousins of one note.
    Suppress {
        /// Note export (`.csv` or `.json`).
        #[arg(short, long)]
        notes: PathBuf,

        /// Id of the note whose cousins are wanted.
        #[arg(long)]
        note: i64,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CousinsConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(&config, cli.verbose) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &CousinsConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Rules { action } => cmd_rules(config, action),

        Commands::Dupes {
            notes,
            field,
            exact,
            format,
        } => cmd_dupes(config, &notes, field.as_deref(), exact, format),

        Commands::Suppress {
            notes,
            note,
            format,
        } => cmd_suppress(config, &notes, note, format),

        Commands::Config { show } => cmd_config(config, show),
    }
}
