//! Rule set evaluation.
//!
//! Runs a list of rules in one of two modes:
//!
//! - **Suppression**: one triggering note against the target pools. Yields
//!   the ids to hold back, never including the trigger itself.
//! - **Grouping**: whole source pools against whole target pools. Yields
//!   labelled duplicate groups in order of first creation.
//!
//! Each call owns one [`MatchContext`], so normalization and cloze pattern
//! caches never outlive the evaluation.

use crate::matching::{MatchContext, MatchSettings};
use crate::models::{DuplicateGroup, FieldRef, MatchRule, Note, NoteId, PoolEntry};
use crate::services::exact::{exact_duplicates, merge_reports};
use crate::storage::{PoolProvider, ReportingSink, SuppressionSink};
use crate::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::instrument;

/// Evaluates rules against pools.
///
/// # Example
///
/// ```rust
/// use cousins::models::{Comparator, MatchRule, Note, NoteTypeId};
/// use cousins::services::RuleSetEvaluator;
/// use cousins::storage::NoteCollection;
///
/// let basic = NoteTypeId::new(1);
/// let notes = NoteCollection::new(vec![
///     Note::new(1, basic).with_field("Back", "Paris is nice"),
///     Note::new(2, basic).with_field("Back", "Paris is nice"),
///     Note::new(3, basic).with_field("Back", "Rome"),
/// ]);
/// let rule = MatchRule::new(basic, "Back", basic, "Back", Comparator::Similarity, 0.9);
///
/// let groups = RuleSetEvaluator::default()
///     .evaluate_for_grouping(&[rule], &notes, None)
///     .unwrap();
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].label, "[similarity] Paris is nice");
/// assert_eq!(groups[0].len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSetEvaluator {
    settings: MatchSettings,
}

impl RuleSetEvaluator {
    /// Creates an evaluator with the given match settings.
    #[must_use]
    pub const fn new(settings: MatchSettings) -> Self {
        Self { settings }
    }

    /// Returns the match settings.
    #[must_use]
    pub const fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Finds the cousins of one note.
    ///
    /// For each rule whose source type is the note's type, the note's source
    /// field value is compared against the target pool with the note itself
    /// removed. The target ids of all matches are unioned.
    ///
    /// Rules whose source field the note lacks are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if a pool cannot be produced or a cloze pattern
    /// cannot be compiled.
    #[instrument(
        skip(self, rules, record, provider),
        fields(operation = "evaluate_for_suppression", note_id = %record.id, rules = rules.len())
    )]
    pub fn evaluate_for_suppression<P>(
        &self,
        rules: &[MatchRule],
        record: &Note,
        provider: &P,
    ) -> Result<BTreeSet<NoteId>>
    where
        P: PoolProvider + ?Sized,
    {
        let mut ctx = MatchContext::new(self.settings);
        let mut cousins = BTreeSet::new();

        for rule in rules.iter().filter(|rule| record.is_type(rule.source_type_id)) {
            let Some(my_value) = record.field(&rule.source_field) else {
                tracing::warn!(
                    note_id = %record.id,
                    field = %rule.source_field,
                    "Note lacks the rule's source field, skipping rule"
                );
                continue;
            };

            let pool: Vec<PoolEntry> = provider
                .pool(&rule.target())?
                .into_iter()
                .filter(|entry| entry.id != record.id)
                .collect();
            let texts: Vec<&str> = pool.iter().map(|entry| entry.text.as_str()).collect();

            let pairs = rule.test_with(&mut ctx, &[my_value], &texts)?;
            let matched: HashSet<&str> = pairs.iter().map(|(_, b)| b.as_str()).collect();
            let found: BTreeSet<NoteId> = pool
                .iter()
                .filter(|entry| matched.contains(entry.text.as_str()))
                .map(|entry| entry.id)
                .collect();

            record_rule_metrics(rule, "suppression", pairs.len());
            tracing::debug!(rule = %rule, pool = pool.len(), found = found.len(), "Evaluated rule");
            cousins.extend(found);
        }

        Ok(cousins)
    }

    /// Finds cousins of one note and hands them to a suppression sink.
    ///
    /// The sink is not called when there is nothing to suppress.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation or the sink fails.
    pub fn suppress_cousins<P, S>(
        &self,
        rules: &[MatchRule],
        record: &Note,
        provider: &P,
        sink: &mut S,
    ) -> Result<BTreeSet<NoteId>>
    where
        P: PoolProvider + ?Sized,
        S: SuppressionSink + ?Sized,
    {
        let cousins = self.evaluate_for_suppression(rules, record, provider)?;
        if !cousins.is_empty() {
            sink.suppress(&cousins)?;
        }
        Ok(cousins)
    }

    /// Groups matching notes across whole pools.
    ///
    /// With `field` set, only rules whose source field has that name run.
    /// A rule whose source and target are the same field pulls its pool once.
    /// Every matched value pair expands into all pairs of notes holding those
    /// values; a note is never paired with itself. Pairs are unioned into
    /// groups labelled `[<comparator>] <source value>`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pool cannot be produced or a cloze pattern
    /// cannot be compiled.
    #[instrument(
        skip(self, rules, provider),
        fields(operation = "evaluate_for_grouping", rules = rules.len())
    )]
    pub fn evaluate_for_grouping<P>(
        &self,
        rules: &[MatchRule],
        provider: &P,
        field: Option<&str>,
    ) -> Result<Vec<DuplicateGroup>>
    where
        P: PoolProvider + ?Sized,
    {
        let mut ctx = MatchContext::new(self.settings);
        let mut report = GroupAccumulator::default();

        for rule in select_rules(rules, field) {
            let source_pool = provider.pool(&rule.source())?;
            let fetched;
            let target_pool: &[PoolEntry] = if rule.is_same_field() {
                &source_pool
            } else {
                fetched = provider.pool(&rule.target())?;
                &fetched
            };

            let sources = ValueIndex::new(&source_pool);
            let targets = ValueIndex::new(target_pool);
            let pairs = rule.test_with(&mut ctx, &sources.values, &targets.values)?;

            let mut by_source: HashMap<&str, Vec<&str>> = HashMap::new();
            for (a, b) in &pairs {
                by_source.entry(a.as_str()).or_default().push(b.as_str());
            }

            let mut local = GroupAccumulator::default();
            for &a in &sources.values {
                let Some(matched) = by_source.get(a) else {
                    continue;
                };
                let label = rule.group_label(a);
                for b in matched {
                    for &ia in sources.ids(a) {
                        for &ib in targets.ids(b) {
                            if ia != ib {
                                local.add(&label, [ia, ib]);
                            }
                        }
                    }
                }
            }

            record_rule_metrics(rule, "grouping", pairs.len());
            tracing::debug!(
                rule = %rule,
                source_pool = source_pool.len(),
                target_pool = target_pool.len(),
                groups = local.len(),
                "Evaluated rule"
            );
            report.merge(local);
        }

        Ok(report.into_groups())
    }

    /// Builds a full duplicate report and hands it to a reporting sink.
    ///
    /// With `include_exact`, groups of identical values are computed too and
    /// placed before the fuzzy groups. A named `field` is scanned in every
    /// note type that has it, whether or not a rule reads it. Without a
    /// field name the distinct rule source fields are scanned.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation or the sink fails.
    pub fn report_duplicates<P, S>(
        &self,
        rules: &[MatchRule],
        provider: &P,
        field: Option<&str>,
        include_exact: bool,
        sink: &mut S,
    ) -> Result<Vec<DuplicateGroup>>
    where
        P: PoolProvider + ?Sized,
        S: ReportingSink + ?Sized,
    {
        let exact = if include_exact {
            let mut accumulator = GroupAccumulator::default();
            for source in exact_sources(rules, provider, field)? {
                for group in exact_duplicates(&provider.pool(&source)?) {
                    accumulator.add(&group.label, group.note_ids);
                }
            }
            accumulator.into_groups()
        } else {
            Vec::new()
        };

        let fuzzy = self.evaluate_for_grouping(rules, provider, field)?;
        let groups = merge_reports(exact, fuzzy);
        sink.report(&groups)?;
        Ok(groups)
    }
}

/// Distinct fields to scan for exact duplicates.
fn exact_sources<P>(
    rules: &[MatchRule],
    provider: &P,
    field: Option<&str>,
) -> Result<Vec<FieldRef>>
where
    P: PoolProvider + ?Sized,
{
    let mut sources: Vec<FieldRef> = match field {
        Some(name) => provider
            .types_with_field(name)?
            .into_iter()
            .map(|type_id| FieldRef::new(type_id, name))
            .collect(),
        None => Vec::new(),
    };
    for rule in select_rules(rules, field) {
        let source = rule.source();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    Ok(sources)
}

fn select_rules<'a>(
    rules: &'a [MatchRule],
    field: Option<&'a str>,
) -> impl Iterator<Item = &'a MatchRule> {
    rules
        .iter()
        .filter(move |rule| field.is_none_or(|name| rule.source_field == name))
}

fn record_rule_metrics(rule: &MatchRule, mode: &'static str, pairs: usize) {
    metrics::counter!("cousins_rules_evaluated_total", "mode" => mode).increment(1);
    metrics::counter!(
        "cousins_pairs_matched_total",
        "comparator" => rule.comparator.as_str()
    )
    .increment(u64::try_from(pairs).unwrap_or(u64::MAX));
}

/// Distinct values of a pool in first-seen order, with the ids holding each.
struct ValueIndex<'p> {
    values: Vec<&'p str>,
    ids: HashMap<&'p str, Vec<NoteId>>,
}

impl<'p> ValueIndex<'p> {
    fn new(pool: &'p [PoolEntry]) -> Self {
        let mut values = Vec::new();
        let mut ids: HashMap<&'p str, Vec<NoteId>> = HashMap::new();
        for entry in pool {
            let text = entry.text.as_str();
            let holders = ids.entry(text).or_insert_with(|| {
                values.push(text);
                Vec::new()
            });
            holders.push(entry.id);
        }
        Self { values, ids }
    }

    fn ids(&self, value: &str) -> &[NoteId] {
        self.ids.get(value).map_or(&[][..], Vec::as_slice)
    }
}

/// Labelled groups in order of first creation.
#[derive(Default)]
struct GroupAccumulator {
    groups: Vec<DuplicateGroup>,
    index: HashMap<String, usize>,
}

impl GroupAccumulator {
    fn add(&mut self, label: &str, ids: impl IntoIterator<Item = NoteId>) {
        let idx = match self.index.get(label) {
            Some(&idx) => idx,
            None => {
                self.index.insert(label.to_string(), self.groups.len());
                self.groups.push(DuplicateGroup::new(label));
                self.groups.len() - 1
            },
        };
        self.groups[idx].note_ids.extend(ids);
    }

    fn merge(&mut self, other: Self) {
        for group in other.groups {
            self.add(&group.label, group.note_ids);
        }
    }

    fn len(&self) -> usize {
        self.groups.len()
    }

    fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
    }
}
