//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `rules.rs`: Rule management (list, add, remove, check)
//! - `dupes.rs`: Duplicate report over a note file
//! - `suppress.rs`: Cousins of one note
//! - `config.rs`: Configuration display command

mod config;
mod dupes;
mod rules;
mod suppress;

use clap::{Subcommand, ValueEnum};
use cousins::models::Comparator;

// Re-export command functions
pub use config::cmd_config;
pub use dupes::cmd_dupes;
pub use rules::cmd_rules;
pub use suppress::cmd_suppress;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON on stdout.
    Json,
}

/// Rule subcommands.
#[derive(Subcommand)]
pub enum RulesAction {
    /// List the stored rules with their indices.
    List {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Add a rule.
    Add {
        /// Source note type id.
        #[arg(long)]
        source_type: i64,

        /// Source field name.
        #[arg(long)]
        source_field: String,

        /// Target note type id (default: the source type).
        #[arg(long)]
        target_type: Option<i64>,

        /// Target field name (default: the source field).
        #[arg(long)]
        target_field: Option<String>,

        /// Comparator: similarity, prefix, contains, `contained_by` or `cloze_contained_by`.
        #[arg(short, long, value_parser = parse_comparator)]
        comparator: Comparator,

        /// Threshold in [0, 1]; only similarity and prefix read it.
        #[arg(short, long, default_value_t = 1.0)]
        threshold: f64,
    },

    /// Remove the rule at an index shown by `rules list`.
    Remove {
        /// Rule index.
        index: usize,
    },

    /// Report stored rows that cannot be loaded.
    Check,
}

/// Parses a comparator name for clap.
fn parse_comparator(s: &str) -> Result<Comparator, String> {
    s.parse::<Comparator>().map_err(|e| {
        let names: Vec<&str> = Comparator::all().iter().map(Comparator::as_str).collect();
        format!("{e} (expected one of: {})", names.join(", "))
    })
}
