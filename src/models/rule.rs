//! Match rules and the comparator enumeration.

use super::note::{FieldRef, NoteTypeId};
use crate::matching::{MatchContext, PairSet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The comparison strategy a rule applies.
///
/// The set is closed: every dispatch over it is an exhaustive `match`, so a
/// new comparator cannot be added without handling it everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Ratcliff/Obershelp ratio of the normalized texts exceeds the threshold.
    Similarity,
    /// The shared leading run covers more than `threshold` of the longer text.
    Prefix,
    /// The target text occurs inside the source text.
    Contains,
    /// The source text occurs inside the target text.
    ContainedBy,
    /// A cloze answer of the source text occurs as a whole word in the target.
    ClozeContainedBy,
}

impl Comparator {
    /// Returns all comparators in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Similarity,
            Self::Prefix,
            Self::Contains,
            Self::ContainedBy,
            Self::ClozeContainedBy,
        ]
    }

    /// Returns the stored name of the comparator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::Prefix => "prefix",
            Self::Contains => "contains",
            Self::ContainedBy => "contained_by",
            Self::ClozeContainedBy => "cloze_contained_by",
        }
    }

    /// Parses a stored comparator name.
    ///
    /// Matching is exact: stored rows are written by [`Comparator::as_str`],
    /// so anything else is a corrupt or foreign row.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "similarity" => Some(Self::Similarity),
            "prefix" => Some(Self::Prefix),
            "contains" => Some(Self::Contains),
            "contained_by" => Some(Self::ContainedBy),
            "cloze_contained_by" => Some(Self::ClozeContainedBy),
            _ => None,
        }
    }

    /// Returns true if the comparator reads the rule threshold.
    #[must_use]
    pub const fn uses_threshold(&self) -> bool {
        matches!(self, Self::Similarity | Self::Prefix)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidComparatorName(s.to_string()))
    }
}

/// A single cousin rule.
///
/// Binds a source field, a target field, a comparator and a threshold. The
/// threshold is always present, even for comparators that ignore it, so the
/// stored row keeps a fixed shape.
///
/// # Example
///
/// ```rust
/// use cousins::models::{Comparator, MatchRule, NoteTypeId};
///
/// let basic = NoteTypeId::new(1);
/// let rule = MatchRule::new(basic, "Back", basic, "Back", Comparator::Prefix, 0.65);
///
/// let pairs = rule.test(&["abcdefg"], &["abcdexx"]).unwrap();
/// assert!(pairs.contains(&("abcdefg".to_string(), "abcdexx".to_string())));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRule {
    /// Note type the left-hand pool comes from.
    pub source_type_id: NoteTypeId,
    /// Field the left-hand pool comes from.
    pub source_field: String,
    /// Note type the right-hand pool comes from.
    pub target_type_id: NoteTypeId,
    /// Field the right-hand pool comes from.
    pub target_field: String,
    /// The comparison strategy.
    pub comparator: Comparator,
    /// Comparator threshold in `[0, 1]`.
    pub threshold: f64,
}

impl MatchRule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(
        source_type_id: NoteTypeId,
        source_field: impl Into<String>,
        target_type_id: NoteTypeId,
        target_field: impl Into<String>,
        comparator: Comparator,
        threshold: f64,
    ) -> Self {
        Self {
            source_type_id,
            source_field: source_field.into(),
            target_type_id,
            target_field: target_field.into(),
            comparator,
            threshold,
        }
    }

    /// Returns the source field reference.
    #[must_use]
    pub fn source(&self) -> FieldRef {
        FieldRef::new(self.source_type_id, self.source_field.clone())
    }

    /// Returns the target field reference.
    #[must_use]
    pub fn target(&self) -> FieldRef {
        FieldRef::new(self.target_type_id, self.target_field.clone())
    }

    /// Returns true if source and target name the same type and field.
    #[must_use]
    pub fn is_same_field(&self) -> bool {
        self.source_type_id == self.target_type_id && self.source_field == self.target_field
    }

    /// Returns the duplicate-group label for a matched source value.
    #[must_use]
    pub fn group_label(&self, source_value: &str) -> String {
        format!("[{}] {source_value}", self.comparator)
    }

    /// Validates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] if a field name is empty or the
    /// threshold is not a finite number in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.source_field.trim().is_empty() {
            return Err(Error::InvalidRule("source field is empty".to_string()));
        }
        if self.target_field.trim().is_empty() {
            return Err(Error::InvalidRule("target field is empty".to_string()));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidRule(format!(
                "threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Runs the rule over two pools with a fresh, default match context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if a cloze answer cannot be compiled.
    pub fn test<A, B>(&self, pool_a: &[A], pool_b: &[B]) -> Result<PairSet>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        self.test_with(&mut MatchContext::default(), pool_a, pool_b)
    }

    /// Runs the rule over two pools using a caller-supplied match context.
    ///
    /// The context carries the settings and the call-scoped caches; reuse one
    /// context for all rules of a single evaluation and drop it afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if a cloze answer cannot be compiled.
    pub fn test_with<A, B>(
        &self,
        ctx: &mut MatchContext,
        pool_a: &[A],
        pool_b: &[B],
    ) -> Result<PairSet>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        self.comparator.compare(ctx, pool_a, pool_b, self.threshold)
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} by {}",
            self.source(),
            self.target(),
            self.comparator
        )?;
        if self.comparator.uses_threshold() {
            write!(f, " > {}", self.threshold)?;
        }
        Ok(())
    }
}

/// An ordered sequence of rules.
///
/// Order is evaluation order and, for reporting, the order in which groups
/// are first created. A set is never edited in place: [`RuleSet::with_rule`]
/// and [`RuleSet::without`] return a new set that is saved back wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<MatchRule>);

impl RuleSet {
    /// Creates a rule set from rules in evaluation order.
    #[must_use]
    pub const fn new(rules: Vec<MatchRule>) -> Self {
        Self(rules)
    }

    /// Returns the rules as a slice.
    #[must_use]
    pub fn rules(&self) -> &[MatchRule] {
        &self.0
    }

    /// Returns an iterator over the rules.
    pub fn iter(&self) -> std::slice::Iter<'_, MatchRule> {
        self.0.iter()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new set with `rule` appended.
    #[must_use]
    pub fn with_rule(&self, rule: MatchRule) -> Self {
        let mut rules = self.0.clone();
        rules.push(rule);
        Self(rules)
    }

    /// Returns a new set without the rule at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `index` is out of range.
    pub fn without(&self, index: usize) -> Result<Self> {
        if index >= self.0.len() {
            return Err(Error::InvalidInput(format!(
                "rule index {index} out of range (have {})",
                self.0.len()
            )));
        }
        let mut rules = self.0.clone();
        rules.remove(index);
        Ok(Self(rules))
    }

    /// Returns the rules whose source field has the given name.
    pub fn for_source_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a MatchRule> {
        self.0.iter().filter(move |rule| rule.source_field == field)
    }

    /// Consumes the set and returns the rules.
    #[must_use]
    pub fn into_inner(self) -> Vec<MatchRule> {
        self.0
    }
}

impl From<Vec<MatchRule>> for RuleSet {
    fn from(rules: Vec<MatchRule>) -> Self {
        Self(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a MatchRule;
    type IntoIter = std::slice::Iter<'a, MatchRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
