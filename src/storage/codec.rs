//! Persisted rule row format.
//!
//! A rule is stored as a fixed six-element JSON array:
//!
//! ```text
//! [source_type_id, source_field, target_type_id, target_field, comparator, threshold]
//! [1, "Back", 1, "Back", "prefix", 0.65]
//! ```
//!
//! This layout is the one compatibility-sensitive artifact of the crate:
//! element order, comparator names and number types must stay stable.

use crate::models::{Comparator, MatchRule, NoteTypeId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One persisted rule, exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRuleRow(
    /// Source note type id.
    pub i64,
    /// Source field name.
    pub String,
    /// Target note type id.
    pub i64,
    /// Target field name.
    pub String,
    /// Comparator name.
    pub String,
    /// Threshold.
    pub f64,
);

impl RawRuleRow {
    /// Lexicographic order over all six elements.
    ///
    /// Thresholds compare with [`f64::total_cmp`], so the order is total even
    /// for rows that would fail validation.
    #[must_use]
    pub fn cmp_lexicographic(&self, other: &Self) -> Ordering {
        self.0
            .cmp(&other.0)
            .then_with(|| self.1.cmp(&other.1))
            .then_with(|| self.2.cmp(&other.2))
            .then_with(|| self.3.cmp(&other.3))
            .then_with(|| self.4.cmp(&other.4))
            .then_with(|| self.5.total_cmp(&other.5))
    }
}

/// Encodes a rule as a stored row.
///
/// # Example
///
/// ```rust
/// use cousins::models::{Comparator, MatchRule, NoteTypeId};
/// use cousins::storage::codec::{decode, encode};
///
/// let rule = MatchRule::new(NoteTypeId::new(1), "Back", NoteTypeId::new(1), "Back", Comparator::Prefix, 0.65);
/// let row = encode(&rule);
/// assert_eq!(row.4, "prefix");
/// assert_eq!(decode(row).unwrap(), rule);
/// ```
#[must_use]
pub fn encode(rule: &MatchRule) -> RawRuleRow {
    RawRuleRow(
        rule.source_type_id.get(),
        rule.source_field.clone(),
        rule.target_type_id.get(),
        rule.target_field.clone(),
        rule.comparator.as_str().to_string(),
        rule.threshold,
    )
}

/// Decodes a stored row into a rule.
///
/// # Errors
///
/// Returns [`Error::InvalidComparatorName`] if the comparator name is not
/// one of the five known names.
pub fn decode(row: RawRuleRow) -> Result<MatchRule> {
    let RawRuleRow(source_type_id, source_field, target_type_id, target_field, name, threshold) =
        row;
    let comparator: Comparator = name.parse()?;
    Ok(MatchRule::new(
        NoteTypeId::new(source_type_id),
        source_field,
        NoteTypeId::new(target_type_id),
        target_field,
        comparator,
        threshold,
    ))
}

/// Decodes and validates one untyped stored row.
///
/// # Errors
///
/// - [`Error::MalformedRuleRow`] for the wrong arity or element types
/// - [`Error::InvalidComparatorName`] for an unknown comparator
/// - [`Error::InvalidRule`] for an empty field or out-of-range threshold
pub fn decode_value(index: usize, value: &serde_json::Value) -> Result<MatchRule> {
    let row: RawRuleRow =
        serde_json::from_value(value.clone()).map_err(|e| Error::MalformedRuleRow {
            index,
            cause: e.to_string(),
        })?;
    let rule = decode(row)?;
    rule.validate()?;
    Ok(rule)
}

/// Result of decoding a full stored row list.
#[derive(Debug, Default)]
pub struct DecodedRules {
    /// Rules that decoded cleanly, in stored order.
    pub rules: Vec<MatchRule>,
    /// Rows that were skipped, with their position and the reason.
    pub skipped: Vec<(usize, Error)>,
}

impl DecodedRules {
    /// Returns true if every row decoded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decodes every row, skipping the bad ones instead of failing.
#[must_use]
pub fn decode_rows(values: &[serde_json::Value]) -> DecodedRules {
    let mut decoded = DecodedRules::default();
    for (index, value) in values.iter().enumerate() {
        match decode_value(index, value) {
            Ok(rule) => decoded.rules.push(rule),
            Err(e) => decoded.skipped.push((index, e)),
        }
    }
    decoded
}

/// Encodes rules and sorts the rows for persisting.
#[must_use]
pub fn encode_sorted<'a>(rules: impl IntoIterator<Item = &'a MatchRule>) -> Vec<RawRuleRow> {
    let mut rows: Vec<RawRuleRow> = rules.into_iter().map(encode).collect();
    rows.sort_by(RawRuleRow::cmp_lexicographic);
    rows
}
