//! In-memory stores and sinks for hosts and tests.

use crate::models::{DuplicateGroup, NoteId};
use crate::storage::codec::RawRuleRow;
use crate::storage::traits::{ReportingSink, RuleStore, SuppressionSink};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeSet;

/// Rule store that keeps its rows in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleStore {
    rows: Vec<Value>,
}

impl InMemoryRuleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given untyped rows.
    #[must_use]
    pub const fn from_values(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    /// Returns the stored rows.
    #[must_use]
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }
}

impl RuleStore for InMemoryRuleStore {
    fn load_rows(&self) -> Result<Vec<Value>> {
        Ok(self.rows.clone())
    }

    fn save_rows(&mut self, rows: &[RawRuleRow]) -> Result<()> {
        self.rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::OperationFailed {
                operation: "serialize_rules".to_string(),
                cause: e.to_string(),
            })?;
        Ok(())
    }
}

/// Suppression sink that records every suppressed id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySuppressionSink {
    suppressed: BTreeSet<NoteId>,
    batches: usize,
}

impl InMemorySuppressionSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every id suppressed so far.
    #[must_use]
    pub const fn suppressed(&self) -> &BTreeSet<NoteId> {
        &self.suppressed
    }

    /// Returns how many times the sink was called.
    #[must_use]
    pub const fn batches(&self) -> usize {
        self.batches
    }
}

impl SuppressionSink for InMemorySuppressionSink {
    fn suppress(&mut self, ids: &BTreeSet<NoteId>) -> Result<()> {
        self.suppressed.extend(ids.iter().copied());
        self.batches += 1;
        Ok(())
    }
}

/// Reporting sink that keeps the last report.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportingSink {
    groups: Vec<DuplicateGroup>,
}

impl InMemoryReportingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently reported groups.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }
}

impl ReportingSink for InMemoryReportingSink {
    fn report(&mut self, groups: &[DuplicateGroup]) -> Result<()> {
        self.groups = groups.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_store_save_replaces_rows() {
        let mut store = InMemoryRuleStore::from_values(vec![json!("stale")]);
        store
            .save_rows(&[RawRuleRow(1, "Back".into(), 1, "Back".into(), "prefix".into(), 0.5)])
            .unwrap();
        assert_eq!(
            store.load_rows().unwrap(),
            vec![json!([1, "Back", 1, "Back", "prefix", 0.5])]
        );
    }

    #[test]
    fn test_suppression_sink_accumulates() {
        let mut sink = InMemorySuppressionSink::new();
        sink.suppress(&BTreeSet::from([NoteId::new(1), NoteId::new(2)]))
            .unwrap();
        sink.suppress(&BTreeSet::from([NoteId::new(2), NoteId::new(3)]))
            .unwrap();
        assert_eq!(sink.suppressed().len(), 3);
        assert_eq!(sink.batches(), 2);
    }

    #[test]
    fn test_reporting_sink_keeps_order() {
        let mut sink = InMemoryReportingSink::new();
        let groups = vec![DuplicateGroup::new("b"), DuplicateGroup::new("a")];
        sink.report(&groups).unwrap();
        assert_eq!(sink.groups()[0].label, "b");
    }
}
