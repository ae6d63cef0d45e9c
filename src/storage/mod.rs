//! Storage layer.
//!
//! Everything the evaluator reads from or writes to lives behind a trait:
//!
//! | Concern | Trait | Implementations |
//! |---------|-------|-----------------|
//! | Rules | [`RuleStore`] | [`JsonFileRuleStore`], [`InMemoryRuleStore`] |
//! | Pools | [`PoolProvider`] | [`NoteCollection`] |
//! | Suppression | [`SuppressionSink`] | [`InMemorySuppressionSink`] |
//! | Reports | [`ReportingSink`] | [`InMemoryReportingSink`] |
//!
//! [`RuleRepository`] sits on top of a rule store and turns raw rows into a
//! validated [`crate::models::RuleSet`].

pub mod codec;
mod json_file;
mod memory;
mod notes;
mod rules;
mod traits;

pub use codec::{DecodedRules, RawRuleRow};
pub use json_file::{JsonFileRuleStore, RULES_KEY};
pub use memory::{InMemoryReportingSink, InMemoryRuleStore, InMemorySuppressionSink};
pub use notes::{NoteCollection, NoteFormat};
pub use rules::RuleRepository;
pub use traits::{PoolProvider, ReportingSink, RuleStore, SuppressionSink};
