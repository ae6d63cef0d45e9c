//! # Cousins
//!
//! Fuzzy cousin matching for note collections.
//!
//! Cousins finds notes that are related to each other without being siblings:
//! two notes whose fields are similar, share a prefix, contain one another, or
//! where a cloze answer of one note appears in the other. The matches drive
//! two consumers:
//!
//! - **Suppression**: after a note is reviewed, its cousins are pulled out of
//!   the current queue so the answer is not given away.
//! - **Duplicate reporting**: every rule is run across whole pools and the
//!   matched notes are reported as labelled groups.
//!
//! ## Layout
//!
//! - [`matching`]: normalizer, sequence ratio and the five comparators
//! - [`models`]: notes, pools, match rules and duplicate groups
//! - [`services`]: the rule set evaluator and exact duplicate grouping
//! - [`storage`]: row codec, rule stores, pool providers and sinks
//! - [`config`] and [`observability`]: ambient configuration and logging
//!
//! ## Example
//!
//! ```rust
//! use cousins::models::{Comparator, MatchRule, Note, NoteId, NoteTypeId};
//! use cousins::services::RuleSetEvaluator;
//! use cousins::storage::NoteCollection;
//!
//! let basic = NoteTypeId::new(1);
//! let rule = MatchRule::new(basic, "Back", basic, "Back", Comparator::Prefix, 0.65);
//!
//! let notes = NoteCollection::new(vec![
//!     Note::new(1, basic).with_field("Back", "abcdefg"),
//!     Note::new(2, basic).with_field("Back", "abcdexx"),
//! ]);
//!
//! let evaluator = RuleSetEvaluator::default();
//! let trigger = notes.get(NoteId::new(1)).cloned().expect("note 1 exists");
//! let cousins = evaluator
//!     .evaluate_for_suppression(&[rule], &trigger, &notes)
//!     .expect("evaluation succeeds");
//! assert!(cousins.contains(&NoteId::new(2)));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod matching;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::CousinsConfig;
pub use matching::{MatchContext, MatchSettings, PairSet, normalize};
pub use models::{
    Comparator, DuplicateGroup, FieldRef, MatchRule, Note, NoteId, NoteTypeId, PoolEntry, RuleSet,
};
pub use services::RuleSetEvaluator;
pub use storage::{PoolProvider, ReportingSink, RuleRepository, RuleStore, SuppressionSink};

/// Error type for cousins operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | A note file or CLI argument cannot be interpreted |
/// | `OperationFailed` | I/O, JSON or CSV failures in stores and providers |
/// | `InvalidComparatorName` | A stored row names a comparator outside the five known ones |
/// | `MalformedRuleRow` | A stored row has the wrong arity or element types |
/// | `InvalidRule` | A rule has an empty field name or a threshold outside `[0, 1]` |
/// | `Pattern` | A cloze answer cannot be compiled into a word-boundary pattern |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Rule or note files cannot be read or written
    /// - JSON, TOML or CSV content cannot be parsed
    /// - A pool provider cannot produce a pool
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A persisted rule row named an unknown comparator.
    ///
    /// Names must match one of `similarity`, `prefix`, `contains`,
    /// `contained_by` or `cloze_contained_by` exactly.
    #[error("invalid comparator name: '{0}'")]
    InvalidComparatorName(String),

    /// A persisted rule row could not be decoded.
    #[error("malformed rule row {index}: {cause}")]
    MalformedRuleRow {
        /// Position of the row in the stored sequence.
        index: usize,
        /// Why the row was rejected.
        cause: String,
    },

    /// A rule failed validation.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A cloze answer produced a pattern the regex engine rejected.
    #[error("pattern error: {0}")]
    Pattern(String),
}

/// Result type alias for cousins operations.
pub type Result<T> = std::result::Result<T, Error>;
