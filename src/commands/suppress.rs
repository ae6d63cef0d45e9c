//! Suppress command handler.

use super::OutputFormat;
use anyhow::{Context, Result, anyhow};
use cousins::{CousinsConfig, Error};
use cousins::models::NoteId;
use cousins::services::RuleSetEvaluator;
use cousins::storage::{JsonFileRuleStore, NoteCollection, RuleRepository, SuppressionSink};
use std::collections::BTreeSet;
use std::path::Path;

/// Suppression sink that prints the ids it is handed.
struct ConsoleSuppression {
    format: OutputFormat,
}

impl SuppressionSink for ConsoleSuppression {
    fn suppress(&mut self, ids: &BTreeSet<NoteId>) -> cousins::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", render_json(ids)?),
            OutputFormat::Text => {
                for id in ids {
                    println!("{id}");
                }
            },
        }
        Ok(())
    }
}

/// Renders suppressed ids as a JSON array of integers.
fn render_json(ids: &BTreeSet<NoteId>) -> cousins::Result<String> {
    serde_json::to_string(ids).map_err(|e| Error::OperationFailed {
        operation: "serialize_suppressed".to_string(),
        cause: e.to_string(),
    })
}

/// Suppress command.
pub fn cmd_suppress(
    config: &CousinsConfig,
    notes: &Path,
    note: i64,
    format: OutputFormat,
) -> Result<()> {
    let rules = RuleRepository::new(JsonFileRuleStore::new(&config.rules_path))
        .load()
        .context("loading rules")?;
    let collection = NoteCollection::from_path(notes)
        .with_context(|| format!("loading notes from {}", notes.display()))?;
    let trigger = collection
        .get(NoteId::new(note))
        .ok_or_else(|| anyhow!("note {note} not found in {}", notes.display()))?;

    let evaluator = RuleSetEvaluator::new(config.matching);
    let mut sink = ConsoleSuppression { format };
    let cousins = evaluator
        .suppress_cousins(rules.rules(), trigger, &collection, &mut sink)
        .context("evaluating rules")?;

    if cousins.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Text => println!("No cousins of note {note}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_is_an_integer_array() {
        let ids: BTreeSet<NoteId> = [2, 1, 30].into_iter().map(NoteId::new).collect();
        assert_eq!(render_json(&ids).unwrap(), "[1,2,30]");
        assert_eq!(render_json(&BTreeSet::new()).unwrap(), "[]");
    }
}
