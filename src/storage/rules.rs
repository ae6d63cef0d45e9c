//! Rule repository: decoded, validated access to a rule store.

use crate::models::{MatchRule, RuleSet};
use crate::storage::codec::{DecodedRules, decode_rows, encode_sorted};
use crate::storage::traits::RuleStore;
use crate::{Error, Result};
use tracing::instrument;

/// Loads and saves whole rule sets through a [`RuleStore`].
///
/// There is no cached rule table: every operation reads the store again, so
/// edits made elsewhere are picked up on the next load.
///
/// # Example
///
/// ```rust
/// use cousins::models::{Comparator, MatchRule, NoteTypeId, RuleSet};
/// use cousins::storage::{InMemoryRuleStore, RuleRepository};
///
/// let mut repo = RuleRepository::new(InMemoryRuleStore::new());
/// let basic = NoteTypeId::new(1);
/// let rules = RuleSet::default()
///     .with_rule(MatchRule::new(basic, "Back", basic, "Back", Comparator::Similarity, 0.9));
///
/// repo.save(&rules).unwrap();
/// assert_eq!(repo.load().unwrap(), rules);
/// ```
#[derive(Debug)]
pub struct RuleRepository<S: RuleStore> {
    store: S,
}

impl<S: RuleStore> RuleRepository<S> {
    /// Creates a repository over a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Loads every row and reports which ones were skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read; bad rows
    /// are listed in [`DecodedRules::skipped`].
    #[instrument(skip(self), fields(operation = "load_rules_checked"))]
    pub fn load_checked(&self) -> Result<DecodedRules> {
        let rows = self.store.load_rows()?;
        let decoded = decode_rows(&rows);
        for (index, error) in &decoded.skipped {
            tracing::warn!(index = *index, error = %error, "Skipping unreadable rule row");
            metrics::counter!("cousins_rule_rows_skipped_total").increment(1);
        }
        tracing::debug!(
            loaded = decoded.rules.len(),
            skipped = decoded.skipped.len(),
            "Loaded rule rows"
        );
        Ok(decoded)
    }

    /// Loads the rule set, skipping unreadable rows with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<RuleSet> {
        Ok(RuleSet::new(self.load_checked()?.rules))
    }

    /// Validates, sorts and persists a whole rule set.
    ///
    /// Nothing is written if any rule fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] for an invalid rule, or the
    /// store's error if writing fails.
    #[instrument(skip(self, rules), fields(operation = "save_rules", rules = rules.len()))]
    pub fn save(&mut self, rules: &RuleSet) -> Result<()> {
        rules.iter().try_for_each(MatchRule::validate)?;
        let rows = encode_sorted(rules);
        self.store.save_rows(&rows)
    }

    /// Appends a rule and saves the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is invalid or the store fails.
    pub fn add(&mut self, rule: MatchRule) -> Result<RuleSet> {
        rule.validate()?;
        let rules = self.load()?.with_rule(rule);
        self.save(&rules)?;
        self.load()
    }

    /// Removes the rule at `index` (in loaded order) and saves the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `index` is out of range, or
    /// the store's error.
    pub fn remove(&mut self, index: usize) -> Result<MatchRule> {
        let rules = self.load()?;
        let removed = rules.rules().get(index).cloned().ok_or_else(|| {
            Error::InvalidInput(format!(
                "rule index {index} out of range (have {})",
                rules.len()
            ))
        })?;
        self.save(&rules.without(index)?)?;
        Ok(removed)
    }
}
