//! Content quality scoring
//!
//! Turns raw article text plus the declared source identity into a
//! [`QualityMetrics`] vector. Scoring is deterministic: identical input
//! always yields bit-identical metrics.

use crate::config::{AccuracyMatching, MetricWeights, QualityConfig};
use crate::error::{EngineError, EngineResult};
use crate::quality::structure::{ContentStats, SaturatingStructure, StructuralScorer};
use crate::types::{ContentSet, QualityMetrics, SourceId};
use crate::utils::clamp01;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Weighted sum of the metrics; a convex combination for valid weights
pub fn overall_score(metrics: &QualityMetrics, weights: &MetricWeights) -> f64 {
    metrics
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(metric, weight)| metric * weight)
        .sum()
}

/// Scores article text against a fixed configuration
pub struct QualityScorer {
    config: QualityConfig,
    /// Lowercased accuracy keys in declared order
    accuracy_keys: Vec<(String, f64)>,
    opinion_pattern: Option<Regex>,
    structure: Box<dyn StructuralScorer>,
}

impl std::fmt::Debug for QualityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityScorer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QualityScorer {
    /// Create a scorer using the default structural heuristics
    pub fn new(config: QualityConfig) -> EngineResult<Self> {
        let structure = SaturatingStructure::new(config.structure);
        Self::with_structure(config, Box::new(structure))
    }

    /// Create a scorer with a custom depth/citations scorer
    pub fn with_structure(
        config: QualityConfig,
        structure: Box<dyn StructuralScorer>,
    ) -> EngineResult<Self> {
        config.validate()?;

        let accuracy_keys = config
            .accuracy
            .entries
            .iter()
            .map(|entry| (entry.source.trim().to_lowercase(), entry.accuracy))
            .collect();

        let opinion_pattern = compile_lexicon(&config.opinion_markers)?;

        Ok(Self {
            config,
            accuracy_keys,
            opinion_pattern,
            structure,
        })
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Score one article for the declared source
    pub fn score(&self, content: &str, source_id: &str) -> QualityMetrics {
        let stats = ContentStats::from_text(content);
        let opinion_hits = self.opinion_hits(content);

        let metrics = QualityMetrics {
            accuracy: self.accuracy_for(source_id),
            readability: self.readability(&stats),
            depth: clamp01(self.structure.depth(&stats)),
            objectivity: clamp01(1.0 - opinion_hits as f64 * self.config.opinion_penalty),
            citations: clamp01(self.structure.citations(&stats)),
        };

        debug!(
            source = source_id,
            words = stats.word_count,
            sentences = stats.sentence_count,
            headings = stats.heading_count,
            opinion_hits,
            "Scored content"
        );

        metrics
    }

    /// Score every article in a content set
    pub fn score_all(&self, contents: &ContentSet) -> BTreeMap<SourceId, QualityMetrics> {
        contents
            .iter()
            .map(|(source_id, content)| (source_id.clone(), self.score(content, source_id)))
            .collect()
    }

    /// Overall score with the configured weights
    pub fn overall_score(&self, metrics: &QualityMetrics) -> f64 {
        overall_score(metrics, &self.config.weights)
    }

    /// Base accuracy for a declared source identity
    pub fn accuracy_for(&self, source_id: &str) -> f64 {
        let needle = source_id.trim().to_lowercase();

        let matched = match self.config.accuracy.matching {
            AccuracyMatching::Exact => self
                .accuracy_keys
                .iter()
                .find(|(key, _)| *key == needle)
                .map(|(_, accuracy)| *accuracy),
            AccuracyMatching::Substring => {
                let hits: Vec<&(String, f64)> = self
                    .accuracy_keys
                    .iter()
                    .filter(|(key, _)| needle.contains(key.as_str()))
                    .collect();
                if hits.len() > 1 {
                    warn!(
                        source = source_id,
                        candidates = ?hits.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>(),
                        "Source identity matches several accuracy keys, using the first declared"
                    );
                }
                hits.first().map(|(_, accuracy)| *accuracy)
            }
        };

        matched.unwrap_or(self.config.accuracy.default_accuracy)
    }

    /// Penalise long sentences, saturating at the clamp bounds
    pub fn readability(&self, stats: &ContentStats) -> f64 {
        clamp01(
            1.0 - (stats.avg_words_per_sentence() - self.config.readability_baseline)
                / self.config.readability_span,
        )
    }

    /// Number of opinion marker hits in the text
    pub fn opinion_hits(&self, content: &str) -> usize {
        self.opinion_pattern
            .as_ref()
            .map(|pattern| pattern.find_iter(content).count())
            .unwrap_or(0)
    }
}

/// Build one case-insensitive, word-bounded alternation from the lexicon
fn compile_lexicon(markers: &[String]) -> EngineResult<Option<Regex>> {
    if markers.is_empty() {
        return Ok(None);
    }

    let alternatives: Vec<String> = markers
        .iter()
        .map(|marker| {
            marker
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| EngineError::config(format!("Invalid opinion lexicon: {}", e)))
}
