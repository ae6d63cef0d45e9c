//! The five pairwise-set comparators.
//!
//! Every comparator takes two pools of raw strings and a threshold and
//! returns the set of all `(a, b)` pairs, `a` from the first pool and `b`
//! from the second, that satisfy it. Pairs always hold the raw strings so the
//! evaluator can map them back to notes.
//!
//! | Comparator | Predicate |
//! |------------|-----------|
//! | `similarity` | ratio of normalized texts > threshold (top-N closest per form) |
//! | `prefix` | common prefix > threshold x longer length |
//! | `contains` | `b` is a substring of `a` |
//! | `contained_by` | `a` is a substring of `b` |
//! | `cloze_contained_by` | a cloze answer of `a` is a whole word of `b`, ignoring case |
//!
//! `contains` and `contained_by` compare raw text and are case sensitive.
//! Only the cloze comparator folds case.

use super::context::MatchContext;
use super::sequence::close_matches;
use crate::Result;
use crate::models::Comparator;
use std::collections::{BTreeSet, HashMap};

/// Matched `(source, target)` raw string pairs, ordered for stable output.
pub type PairSet = BTreeSet<(String, String)>;

impl Comparator {
    /// Runs this comparator over two pools.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] if a cloze answer cannot be compiled.
    pub fn compare<A, B>(
        self,
        ctx: &mut MatchContext,
        pool_a: &[A],
        pool_b: &[B],
        threshold: f64,
    ) -> Result<PairSet>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        match self {
            Self::Similarity => Ok(similarity(ctx, pool_a, pool_b, threshold)),
            Self::Prefix => Ok(prefix(ctx, pool_a, pool_b, threshold)),
            Self::Contains => Ok(contains(ctx, pool_a, pool_b, threshold)),
            Self::ContainedBy => Ok(contained_by(ctx, pool_a, pool_b, threshold)),
            Self::ClozeContainedBy => cloze_contained_by(ctx, pool_a, pool_b, threshold),
        }
    }
}

/// Lifts a pairwise predicate into a pairwise-set comparator.
///
/// Filters the full cross product of the two pools. Identical raw values on
/// the same side collapse into one pair.
///
/// # Example
///
/// ```rust
/// use cousins::matching::cross_product;
///
/// let pairs = cross_product(&["ab", "cd"], &["abc", "xyz"], |a, b| b.starts_with(a));
/// assert_eq!(pairs.len(), 1);
/// assert!(pairs.contains(&("ab".to_string(), "abc".to_string())));
/// ```
pub fn cross_product<A, B, F>(pool_a: &[A], pool_b: &[B], mut predicate: F) -> PairSet
where
    A: AsRef<str>,
    B: AsRef<str>,
    F: FnMut(&str, &str) -> bool,
{
    let mut pairs = PairSet::new();
    for a in pool_a {
        let a = a.as_ref();
        for b in pool_b {
            let b = b.as_ref();
            if predicate(a, b) {
                pairs.insert((a.to_string(), b.to_string()));
            }
        }
    }
    pairs
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of leading characters two strings share.
///
/// # Example
///
/// ```rust
/// use cousins::matching::common_prefix_len;
///
/// assert_eq!(common_prefix_len("abcdefg", "abcdexx"), 5);
/// assert_eq!(common_prefix_len("same", "same"), 4);
/// assert_eq!(common_prefix_len("", "abc"), 0);
/// ```
#[must_use]
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Similarity comparator.
///
/// Both pools are grouped by normalized form, dropping raw values and forms
/// shorter than the minimum length. Each distinct source form is compared against the
/// distinct target forms with a bounded closest-match search
/// (`similarity_candidates` results, ratio strictly above `threshold`), and
/// every hit expands back to all raw pairs sharing those forms.
///
/// The bound is an approximation: when more than `similarity_candidates`
/// target forms clear the threshold, only the closest are reported.
pub fn similarity<A, B>(
    ctx: &mut MatchContext,
    pool_a: &[A],
    pool_b: &[B],
    threshold: f64,
) -> PairSet
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let limit = ctx.settings().similarity_candidates;
    let sources = group_by_normalized(ctx, pool_a);
    let targets = group_by_normalized(ctx, pool_b);
    let target_forms: Vec<&str> = targets.iter().map(|group| group.form.as_str()).collect();

    let mut pairs = PairSet::new();
    for source in &sources {
        for (idx, _) in close_matches(&source.form, &target_forms, limit, threshold) {
            for a in &source.raws {
                for b in &targets[idx].raws {
                    pairs.insert(((*a).to_string(), (*b).to_string()));
                }
            }
        }
    }
    pairs
}

/// Raw values sharing one normalized form.
struct FormGroup<'p> {
    form: String,
    raws: Vec<&'p str>,
}

/// Groups a pool by normalized form in first-seen order.
fn group_by_normalized<'p, S: AsRef<str>>(
    ctx: &mut MatchContext,
    pool: &'p [S],
) -> Vec<FormGroup<'p>> {
    let min_length = ctx.settings().min_length;
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<FormGroup<'p>> = Vec::new();
    for raw in pool {
        let raw = raw.as_ref();
        if char_len(raw) < min_length {
            continue;
        }
        let form = ctx.normalized(raw);
        if char_len(form) < min_length {
            continue;
        }
        if let Some(&idx) = index.get(form) {
            let raws = &mut groups[idx].raws;
            if !raws.contains(&raw) {
                raws.push(raw);
            }
        } else {
            let form = form.to_string();
            index.insert(form.clone(), groups.len());
            groups.push(FormGroup {
                form,
                raws: vec![raw],
            });
        }
    }
    groups
}

/// Prefix comparator.
///
/// Matches when the shared leading run is longer than `threshold` times the
/// longer string. Raw text, compared from the first character.
pub fn prefix<A, B>(ctx: &MatchContext, pool_a: &[A], pool_b: &[B], threshold: f64) -> PairSet
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let min_length = ctx.settings().min_length;
    cross_product(pool_a, pool_b, |a, b| {
        let longest = char_len(a).max(char_len(b));
        if char_len(a) < min_length || char_len(b) < min_length {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        let needed = threshold * longest as f64;
        #[allow(clippy::cast_precision_loss)]
        let shared = common_prefix_len(a, b) as f64;
        shared > needed
    })
}

/// Contained-by comparator: `a` occurs inside `b`.
///
/// The threshold is ignored.
pub fn contained_by<A, B>(
    ctx: &MatchContext,
    pool_a: &[A],
    pool_b: &[B],
    _threshold: f64,
) -> PairSet
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let min_length = ctx.settings().min_contained_length;
    cross_product(pool_a, pool_b, |a, b| {
        char_len(a) >= min_length && b.contains(a)
    })
}

/// Contains comparator: `b` occurs inside `a`.
///
/// Built from [`contained_by`] with the pools swapped; the pairs are turned
/// back around so the source value stays first.
pub fn contains<A, B>(ctx: &MatchContext, pool_a: &[A], pool_b: &[B], threshold: f64) -> PairSet
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    contained_by(ctx, pool_b, pool_a, threshold)
        .into_iter()
        .map(|(b, a)| (a, b))
        .collect()
}

/// Cloze-contained-by comparator.
///
/// Extracts the cloze answers of each source value and matches them as
/// whole words in the target values. Answers shorter than the containment
/// floor are ignored. The threshold is ignored.
///
/// # Errors
///
/// Returns [`crate::Error::Pattern`] if an answer cannot be compiled.
pub fn cloze_contained_by<A, B>(
    ctx: &mut MatchContext,
    pool_a: &[A],
    pool_b: &[B],
    _threshold: f64,
) -> Result<PairSet>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut pairs = PairSet::new();
    for a in pool_a {
        let a = a.as_ref();
        let patterns = ctx.cloze_patterns(a)?;
        if patterns.is_empty() {
            continue;
        }
        for b in pool_b {
            let b = b.as_ref();
            if patterns.iter().any(|pattern| pattern.is_match(b)) {
                pairs.insert((a.to_string(), b.to_string()));
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchSettings;
    use test_case::test_case;

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    fn run(comparator: Comparator, a: &[&str], b: &[&str], threshold: f64) -> PairSet {
        comparator
            .compare(&mut MatchContext::default(), a, b, threshold)
            .unwrap()
    }

    #[test_case(Comparator::Similarity ; "similarity")]
    #[test_case(Comparator::Prefix ; "prefix")]
    fn test_short_strings_never_match(comparator: Comparator) {
        assert!(run(comparator, &["ab"], &["ab"], 0.0).is_empty());
        assert!(run(comparator, &["abc"], &["abc"], 0.0).is_empty());
        assert!(!run(comparator, &["abcd"], &["abcd"], 0.0).is_empty());
    }

    #[test]
    fn test_similarity_short_raw_value_never_matches() {
        // Lowercasing grows "İİ" past the floor, the raw value stays at two characters.
        assert!(run(Comparator::Similarity, &["İİ"], &["İİ"], 0.5).is_empty());
        assert!(run(Comparator::Similarity, &["İİ"], &["i̇i̇"], 0.0).is_empty());
    }

    #[test_case(Comparator::Contains ; "contains")]
    #[test_case(Comparator::ContainedBy ; "contained by")]
    fn test_short_contained_strings_never_match(comparator: Comparator) {
        assert!(run(comparator, &["abc"], &["abc"], 1.0).is_empty());
        assert_eq!(run(comparator, &["abcd"], &["abcd"], 1.0).len(), 1);
    }

    #[test]
    fn test_prefix_examples() {
        assert_eq!(
            run(Comparator::Prefix, &["abcdefg"], &["abcdexx"], 0.65),
            PairSet::from([pair("abcdefg", "abcdexx")])
        );
        assert!(run(Comparator::Prefix, &["abcdefg"], &["abcdexx"], 0.95).is_empty());
    }

    #[test]
    fn test_prefix_uses_longer_string() {
        // 4 shared of 10 characters
        assert!(run(Comparator::Prefix, &["abcd"], &["abcdxxxxxx"], 0.5).is_empty());
        assert_eq!(run(Comparator::Prefix, &["abcd"], &["abcdxxxxxx"], 0.3).len(), 1);
    }

    #[test]
    fn test_prefix_full_match_at_one_is_strict() {
        assert!(run(Comparator::Prefix, &["same"], &["same"], 1.0).is_empty());
        assert_eq!(run(Comparator::Prefix, &["same"], &["same"], 0.99).len(), 1);
    }

    #[test]
    fn test_similarity_identity() {
        let pairs = run(Comparator::Similarity, &["hello world"], &["hello world"], 0.99);
        assert!(pairs.contains(&pair("hello world", "hello world")));
    }

    #[test]
    fn test_similarity_ignores_cloze_and_case() {
        let pairs = run(
            Comparator::Similarity,
            &["{{c1::Paris::city}} is the capital"],
            &["paris is the capital"],
            0.99,
        );
        assert_eq!(
            pairs,
            PairSet::from([pair("{{c1::Paris::city}} is the capital", "paris is the capital")])
        );
    }

    #[test]
    fn test_similarity_expands_raw_values_per_form() {
        let pairs = run(
            Comparator::Similarity,
            &["Hello World", "hello world"],
            &["HELLO WORLD", "unrelated text"],
            0.9,
        );
        assert_eq!(
            pairs,
            PairSet::from([
                pair("Hello World", "HELLO WORLD"),
                pair("hello world", "HELLO WORLD"),
            ])
        );
    }

    #[test]
    fn test_similarity_threshold() {
        // ratio("abcd", "bcde") == 0.75
        assert_eq!(run(Comparator::Similarity, &["abcd"], &["bcde"], 0.7).len(), 1);
        assert!(run(Comparator::Similarity, &["abcd"], &["bcde"], 0.75).is_empty());
    }

    #[test]
    fn test_similarity_candidate_bound() {
        let targets = ["word1", "word2", "word3", "word4"];
        let mut ctx = MatchContext::new(MatchSettings::default().with_similarity_candidates(2));
        let pairs = similarity(&mut ctx, &["word0"], &targets, 0.5);
        assert_eq!(pairs.len(), 2);

        let pairs = similarity(&mut MatchContext::default(), &["word0"], &targets, 0.5);
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_contained_by() {
        let pairs = run(
            Comparator::ContainedBy,
            &["Paris", "Rome", "xyz"],
            &["Paris is in France", "Lyon"],
            0.0,
        );
        assert_eq!(pairs, PairSet::from([pair("Paris", "Paris is in France")]));
    }

    #[test]
    fn test_contains_reports_source_first() {
        let pairs = run(
            Comparator::Contains,
            &["Paris is in France", "Lyon"],
            &["Paris", "Rome"],
            0.0,
        );
        assert_eq!(pairs, PairSet::from([pair("Paris is in France", "Paris")]));
    }

    #[test]
    fn test_contains_mirrors_contained_by() {
        let a = ["one two three", "four", "three"];
        let b = ["three", "one two three four", "two"];
        let ctx = MatchContext::default();
        let swapped: PairSet = contained_by(&ctx, &b, &a, 0.3)
            .into_iter()
            .map(|(x, y)| (y, x))
            .collect();
        assert_eq!(contains(&ctx, &a, &b, 0.3), swapped);
    }

    #[test]
    fn test_cloze_contained_by_word_boundary() {
        assert_eq!(
            run(Comparator::ClozeContainedBy, &["{{c1::hello}}"], &["say hello now"], 1.0),
            PairSet::from([pair("{{c1::hello}}", "say hello now")])
        );
        assert!(
            run(Comparator::ClozeContainedBy, &["{{c1::hello}}"], &["sayhellonow"], 1.0)
                .is_empty()
        );
    }

    #[test]
    fn test_cloze_folds_case_but_containment_does_not() {
        assert_eq!(
            run(Comparator::ClozeContainedBy, &["{{c1::Paris}}"], &["PARIS is big"], 1.0).len(),
            1
        );
        assert!(run(Comparator::ContainedBy, &["Paris"], &["PARIS is big"], 1.0).is_empty());
    }

    #[test]
    fn test_cloze_contained_by_any_answer() {
        let pairs = run(
            Comparator::ClozeContainedBy,
            &["{{c1::Paris}} is in {{c2::France}}", "no cloze at all"],
            &["France is big", "Spain"],
            0.0,
        );
        assert_eq!(
            pairs,
            PairSet::from([pair("{{c1::Paris}} is in {{c2::France}}", "France is big")])
        );
    }

    #[test]
    fn test_cloze_contained_by_short_answers_ignored() {
        assert!(run(Comparator::ClozeContainedBy, &["{{c1::cat}}"], &["a cat"], 0.0).is_empty());
    }

    #[test]
    fn test_cloze_patterns_cached_per_source() {
        let mut ctx = MatchContext::default();
        let sources = ["{{c1::hello}}", "{{c1::hello}}", "{{c1::world}}"];
        let _ = cloze_contained_by(&mut ctx, &sources, &["hello world"], 0.0).unwrap();
        assert_eq!(ctx.cloze_len(), 2);
    }

    #[test]
    fn test_empty_pools() {
        for comparator in Comparator::all() {
            assert!(run(*comparator, &[], &["something long"], 0.5).is_empty());
            assert!(run(*comparator, &["something long"], &[], 0.5).is_empty());
        }
    }

    #[test]
    fn test_cross_product_collapses_duplicates() {
        let pairs = cross_product(&["same", "same"], &["same"], |a, b| a == b);
        assert_eq!(pairs.len(), 1);
    }
}
