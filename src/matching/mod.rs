//! Matching primitives.
//!
//! The bottom of the stack: text normalization, the sequence-similarity
//! ratio, the call-scoped [`MatchContext`] and the five comparators that turn
//! two pools of strings into a set of matched pairs.

mod comparators;
mod context;
mod normalize;
mod sequence;

pub use comparators::{
    PairSet, cloze_contained_by, common_prefix_len, contained_by, contains, cross_product, prefix,
    similarity,
};
pub use context::{MatchContext, MatchSettings};
pub use normalize::{cloze_answers, normalize, strip_cloze, strip_html};
pub use sequence::{SequenceMatcher, close_matches, ratio};
