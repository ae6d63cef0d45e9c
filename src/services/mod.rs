//! Evaluation services.
//!
//! [`RuleSetEvaluator`] drives the comparators over pools from a
//! [`crate::storage::PoolProvider`]; the exact-duplicate helpers add the
//! identical-value groups that open a duplicate report.

mod evaluator;
mod exact;

pub use evaluator::RuleSetEvaluator;
pub use exact::{EXACT_LABEL, exact_duplicates, merge_reports};
