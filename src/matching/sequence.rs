//! Ratcliff/Obershelp sequence similarity.
//!
//! The ratio is `2 * M / T` where `T` is the total number of characters in
//! both strings and `M` the number of characters in matching blocks. Blocks
//! are found by taking the longest common substring, then recursing into the
//! unmatched text on either side of it.
//!
//! No junk heuristic is applied: every character takes part in matching.

use std::collections::HashMap;

/// Compares one fixed string (`b`) against many candidates (`a`).
///
/// The index of `b` is built once, so a matcher can be reused across a whole
/// candidate list.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
    b_counts: HashMap<char, usize>,
}

impl SequenceMatcher {
    /// Creates a matcher for the fixed string `b`.
    #[must_use]
    pub fn new(b: &str) -> Self {
        let b: Vec<char> = b.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        let mut b_counts: HashMap<char, usize> = HashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b2j.entry(ch).or_default().push(j);
            *b_counts.entry(ch).or_default() += 1;
        }
        Self { b, b2j, b_counts }
    }

    /// Returns the similarity ratio of `a` against the fixed string.
    #[must_use]
    pub fn ratio(&self, a: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let matches = self.matching_characters(&a);
        score(matches, a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from the lengths alone.
    #[must_use]
    pub fn real_quick_ratio(&self, a: &str) -> f64 {
        let la = a.chars().count();
        let lb = self.b.len();
        score(la.min(lb), la + lb)
    }

    /// Upper bound on [`ratio`](Self::ratio) from shared character counts.
    #[must_use]
    pub fn quick_ratio(&self, a: &str) -> f64 {
        let mut available: HashMap<char, usize> = HashMap::new();
        let mut matches = 0;
        let mut la = 0;
        for ch in a.chars() {
            la += 1;
            let left = available
                .entry(ch)
                .or_insert_with(|| self.b_counts.get(&ch).copied().unwrap_or(0));
            if *left > 0 {
                *left -= 1;
                matches += 1;
            }
        }
        score(matches, la + self.b.len())
    }

    /// Total size of the matching blocks between `a` and the fixed string.
    fn matching_characters(&self, a: &[char]) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(a, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows.
    ///
    /// Ties resolve to the earliest start in `a`, then in `b`.
    fn find_longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(ch) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }
        (best_i, best_j, best_k)
    }
}

#[allow(clippy::cast_precision_loss)] // Field values are far below 2^52 characters
fn score(matches: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Returns the similarity ratio of two strings in `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use cousins::matching::ratio;
///
/// assert!((ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
/// assert!((ratio("hello", "hello") - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(b).ratio(a)
}

/// Finds the closest candidates to `word`.
///
/// Returns up to `limit` candidate indices whose ratio against `word` is
/// strictly greater than `cutoff`, best first. Equal scores keep candidate
/// order. The cheap upper bounds are checked before the full ratio.
#[must_use]
pub fn close_matches<S: AsRef<str>>(
    word: &str,
    candidates: &[S],
    limit: usize,
    cutoff: f64,
) -> Vec<(usize, f64)> {
    if limit == 0 {
        return Vec::new();
    }
    let matcher = SequenceMatcher::new(word);
    let mut scored: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, candidate)| {
            let candidate = candidate.as_ref();
            if matcher.real_quick_ratio(candidate) <= cutoff
                || matcher.quick_ratio(candidate) <= cutoff
            {
                return None;
            }
            let ratio = matcher.ratio(candidate);
            (ratio > cutoff).then_some((idx, ratio))
        })
        .collect();
    scored.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));
    scored.truncate(limit);
    scored
}
