//! Dupes command handler.
//!
//! Runs every rule over a note file and prints the duplicate groups.

use super::OutputFormat;
use anyhow::{Context, Result};
use cousins::models::DuplicateGroup;
use cousins::services::RuleSetEvaluator;
use cousins::storage::{JsonFileRuleStore, NoteCollection, ReportingSink, RuleRepository};
use cousins::{CousinsConfig, Error};
use std::path::Path;

/// Reporting sink that prints groups to stdout.
struct ConsoleReport {
    format: OutputFormat,
}

impl ReportingSink for ConsoleReport {
    fn report(&mut self, groups: &[DuplicateGroup]) -> cousins::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json =
                    serde_json::to_string_pretty(groups).map_err(|e| Error::OperationFailed {
                        operation: "serialize_report".to_string(),
                        cause: e.to_string(),
                    })?;
                println!("{json}");
            },
            OutputFormat::Text if groups.is_empty() => println!("No duplicates found"),
            OutputFormat::Text => {
                for group in groups {
                    let ids: Vec<String> = group.note_ids.iter().map(ToString::to_string).collect();
                    println!("{} ({})", group.label, group.len());
                    println!("    {}", ids.join(", "));
                }
            },
        }
        Ok(())
    }
}

/// Dupes command.
pub fn cmd_dupes(
    config: &CousinsConfig,
    notes: &Path,
    field: Option<&str>,
    exact: bool,
    format: OutputFormat,
) -> Result<()> {
    let rules = RuleRepository::new(JsonFileRuleStore::new(&config.rules_path))
        .load()
        .context("loading rules")?;
    let collection = NoteCollection::from_path(notes)
        .with_context(|| format!("loading notes from {}", notes.display()))?
        .with_html_stripped(true);

    tracing::info!(
        rules = rules.len(),
        notes = collection.len(),
        field = field.unwrap_or("*"),
        "Searching for duplicates"
    );

    let evaluator = RuleSetEvaluator::new(config.matching);
    let mut sink = ConsoleReport { format };
    evaluator
        .report_duplicates(rules.rules(), &collection, field, exact, &mut sink)
        .context("evaluating rules")?;
    Ok(())
}
