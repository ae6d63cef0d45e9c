//! Match settings and the call-scoped evaluation context.

use super::normalize::{cloze_answers, normalize};
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::HashMap;

/// Tunables shared by all comparators.
///
/// # Example
///
/// ```rust
/// use cousins::MatchSettings;
///
/// let settings = MatchSettings::default();
/// assert_eq!(settings.min_length, 4);
/// assert_eq!(settings.min_contained_length, 4);
/// assert_eq!(settings.similarity_candidates, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Shortest text (in characters) that similarity and prefix will match.
    pub min_length: usize,
    /// Shortest contained text (in characters) the containment comparators match.
    pub min_contained_length: usize,
    /// Maximum number of closest target forms kept per distinct source form
    /// by the similarity comparator.
    pub similarity_candidates: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            min_length: 4,
            min_contained_length: 4,
            similarity_candidates: 10,
        }
    }
}

impl MatchSettings {
    /// Builder method to set the minimum length.
    #[must_use]
    pub const fn with_min_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self
    }

    /// Builder method to set the minimum contained length.
    #[must_use]
    pub const fn with_min_contained_length(mut self, length: usize) -> Self {
        self.min_contained_length = length;
        self
    }

    /// Builder method to set the similarity candidate bound.
    #[must_use]
    pub const fn with_similarity_candidates(mut self, candidates: usize) -> Self {
        self.similarity_candidates = candidates;
        self
    }
}

/// Settings plus the caches of one evaluation pass.
///
/// Field values repeat a lot, so normalized text and compiled cloze patterns
/// are memoized by raw text. The caches live only as long as the context:
/// create one per evaluation and drop it afterwards, because note text can
/// change between evaluations.
#[derive(Debug, Default)]
pub struct MatchContext {
    settings: MatchSettings,
    normalized: HashMap<String, String>,
    cloze_patterns: HashMap<String, Vec<Regex>>,
}

impl MatchContext {
    /// Creates an empty context with the given settings.
    #[must_use]
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            settings,
            normalized: HashMap::new(),
            cloze_patterns: HashMap::new(),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Returns the normalized form of `raw`, computing it at most once.
    pub fn normalized(&mut self, raw: &str) -> &str {
        self.normalized
            .entry(raw.to_string())
            .or_insert_with(|| normalize(raw))
    }

    /// Returns one word-boundary pattern per distinct cloze answer of `raw`.
    ///
    /// Answers no longer than the containment floor are skipped. Patterns are
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if an answer cannot be compiled.
    pub fn cloze_patterns(&mut self, raw: &str) -> Result<&[Regex]> {
        if !self.cloze_patterns.contains_key(raw) {
            let patterns = build_cloze_patterns(raw, self.settings.min_contained_length)?;
            self.cloze_patterns.insert(raw.to_string(), patterns);
        }
        Ok(self
            .cloze_patterns
            .get(raw)
            .map_or(&[][..], Vec::as_slice))
    }

    /// Number of distinct texts normalized so far.
    #[must_use]
    pub fn normalized_len(&self) -> usize {
        self.normalized.len()
    }

    /// Number of distinct texts whose cloze patterns were built.
    #[must_use]
    pub fn cloze_len(&self) -> usize {
        self.cloze_patterns.len()
    }
}

fn build_cloze_patterns(raw: &str, min_length: usize) -> Result<Vec<Regex>> {
    cloze_answers(raw)
        .into_iter()
        .filter(|answer| answer.chars().count() >= min_length)
        .map(|answer| {
            RegexBuilder::new(&format!(r"\b{}\b", regex::escape(answer)))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Pattern(format!("cloze answer '{answer}': {e}")))
        })
        .collect()
}
