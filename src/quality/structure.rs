//! Structural signals of article text
//!
//! `depth` and `citations` are computed by a pluggable [`StructuralScorer`]
//! over [`ContentStats`]. The default [`SaturatingStructure`] grows linearly
//! with each signal until a configured target, then saturates.

use crate::config::StructureThresholds;
use crate::utils::saturation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence regex"));

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)(^[ \t]{0,3}#{1,6}[ \t]+\S)|(<h[1-6][\s>])|(^[ \t]*={2,}[^=\n]+={2,}[ \t]*$)")
        .expect("heading regex")
});

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\[\d+\])|(\bdoi:\s*\S+)").expect("reference regex"));

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s)\]>]+").expect("link regex"));

/// Counts extracted from one piece of content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub heading_count: usize,
    pub reference_count: usize,
    pub link_count: usize,
}

impl ContentStats {
    /// Extract structural counts from raw text
    pub fn from_text(text: &str) -> Self {
        let word_count = text
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .count();

        Self {
            word_count,
            sentence_count: count_sentences(text),
            heading_count: HEADING.find_iter(text).count(),
            reference_count: REFERENCE.find_iter(text).count(),
            link_count: LINK.find_iter(text).count(),
        }
    }

    pub fn avg_words_per_sentence(&self) -> f64 {
        self.word_count as f64 / self.sentence_count.max(1) as f64
    }

    /// References plus links per 1000 words
    pub fn reference_density(&self) -> f64 {
        (self.reference_count + self.link_count) as f64 * 1000.0 / self.word_count.max(1) as f64
    }
}

/// Count sentences, ignoring terminators inside numbers and before
/// lowercase continuations (`3.14`, `e.g. in`, `U.S. schools`)
fn count_sentences(text: &str) -> usize {
    let has_words = |segment: &str| segment.chars().any(char::is_alphanumeric);

    let mut count = 0;
    let mut start = 0;
    for end in SENTENCE_END.find_iter(text) {
        let continues = text[end.end()..]
            .chars()
            .next()
            .map_or(false, |next| next.is_lowercase() || matches!(next, ',' | ';' | ':' | '…'));
        if continues {
            continue;
        }
        if has_words(&text[start..end.end()]) {
            count += 1;
        }
        start = end.end();
    }
    if has_words(&text[start..]) {
        count += 1;
    }

    count
}

/// Pluggable scoring of depth and citations
///
/// Implementations must return values in `[0, 1]` that never decrease
/// as their structural signal grows.
#[cfg_attr(test, mockall::automock)]
pub trait StructuralScorer: Send + Sync {
    fn depth(&self, stats: &ContentStats) -> f64;

    fn citations(&self, stats: &ContentStats) -> f64;
}

/// Default scorer: linear growth up to configured targets
#[derive(Debug, Clone)]
pub struct SaturatingStructure {
    thresholds: StructureThresholds,
}

impl SaturatingStructure {
    pub fn new(thresholds: StructureThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for SaturatingStructure {
    fn default() -> Self {
        Self::new(StructureThresholds::default())
    }
}

impl StructuralScorer for SaturatingStructure {
    fn depth(&self, stats: &ContentStats) -> f64 {
        let t = &self.thresholds;
        let length = saturation(stats.word_count as f64, t.target_words);
        let sections = saturation(stats.heading_count as f64, t.target_headings);
        t.length_share * length + (1.0 - t.length_share) * sections
    }

    fn citations(&self, stats: &ContentStats) -> f64 {
        saturation(
            stats.reference_density(),
            self.thresholds.target_reference_density,
        )
    }
}
