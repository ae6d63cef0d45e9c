//! Rules command handler.

use super::{OutputFormat, RulesAction};
use anyhow::{Context, Result, bail};
use cousins::CousinsConfig;
use cousins::models::{MatchRule, NoteTypeId};
use cousins::storage::{JsonFileRuleStore, RuleRepository};

/// Rules command.
pub fn cmd_rules(config: &CousinsConfig, action: RulesAction) -> Result<()> {
    let mut repo = RuleRepository::new(JsonFileRuleStore::new(&config.rules_path));

    match action {
        RulesAction::List { format } => {
            let rules = repo.load().context("loading rules")?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&rules)?);
                },
                OutputFormat::Text if rules.is_empty() => {
                    println!("No rules in {}", config.rules_path.display());
                },
                OutputFormat::Text => {
                    for (index, rule) in rules.iter().enumerate() {
                        println!("{index:>3}  {rule}");
                    }
                },
            }
        },

        RulesAction::Add {
            source_type,
            source_field,
            target_type,
            target_field,
            comparator,
            threshold,
        } => {
            let target_field = target_field.unwrap_or_else(|| source_field.clone());
            let rule = MatchRule::new(
                NoteTypeId::new(source_type),
                source_field,
                NoteTypeId::new(target_type.unwrap_or(source_type)),
                target_field,
                comparator,
                threshold,
            );
            let display = rule.to_string();
            let rules = repo.add(rule).context("adding rule")?;
            println!("Added: {display}");
            println!("{} rule(s) in {}", rules.len(), config.rules_path.display());
        },

        RulesAction::Remove { index } => {
            let removed = repo.remove(index).context("removing rule")?;
            println!("Removed: {removed}");
        },

        RulesAction::Check => {
            let checked = repo.load_checked().context("reading rules")?;
            println!(
                "{} rule(s) loaded from {}",
                checked.rules.len(),
                config.rules_path.display()
            );
            for (index, error) in &checked.skipped {
                println!("  row {index}: {error}");
            }
            if !checked.is_clean() {
                bail!("{} rule row(s) could not be loaded", checked.skipped.len());
            }
        },
    }

    Ok(())
}
