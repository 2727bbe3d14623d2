//! Quality scoring configuration

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights of the five quality metrics in the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub accuracy: f64,
    pub readability: f64,
    pub depth: f64,
    pub objectivity: f64,
    pub citations: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.30,
            readability: 0.20,
            depth: 0.25,
            objectivity: 0.15,
            citations: 0.10,
        }
    }
}

impl MetricWeights {
    /// Weights in the same order as `QualityMetrics::as_array`
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.accuracy,
            self.readability,
            self.depth,
            self.objectivity,
            self.citations,
        ]
    }

    pub fn validate(&self) -> EngineResult<()> {
        validate_weights("quality.weights", &self.as_array())
    }
}

/// How a declared source identity is resolved against the accuracy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyMatching {
    /// Case-insensitive lookup of the stable source id
    #[default]
    Exact,
    /// First table key, in declared order, contained in the identity.
    /// Overlapping fragments ("grok" inside a longer name) all match.
    Substring,
}

/// Base accuracy for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyEntry {
    pub source: String,
    pub accuracy: f64,
}

impl AccuracyEntry {
    pub fn new(source: impl Into<String>, accuracy: f64) -> Self {
        Self {
            source: source.into(),
            accuracy,
        }
    }
}

/// Accuracy lookup table resolved once at configuration time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyTable {
    pub entries: Vec<AccuracyEntry>,
    /// Accuracy for identities absent from the table
    pub default_accuracy: f64,
    pub matching: AccuracyMatching,
}

impl Default for AccuracyTable {
    fn default() -> Self {
        Self {
            entries: vec![
                AccuracyEntry::new("britannica", 0.85),
                AccuracyEntry::new("wikipedia", 0.80),
                AccuracyEntry::new("grok", 0.75),
            ],
            default_accuracy: 0.70,
            matching: AccuracyMatching::Exact,
        }
    }
}

impl AccuracyTable {
    pub fn validate(&self) -> EngineResult<()> {
        if !in_unit_interval(self.default_accuracy) {
            return Err(EngineError::config(
                "Default accuracy must be within [0, 1]",
            ));
        }
        for entry in &self.entries {
            if entry.source.trim().is_empty() {
                return Err(EngineError::config("Accuracy table keys cannot be empty"));
            }
            if !in_unit_interval(entry.accuracy) {
                return Err(EngineError::config(format!(
                    "Accuracy for {} must be within [0, 1]",
                    entry.source
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds of the default structural scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureThresholds {
    /// Word count at which the length signal saturates
    pub target_words: f64,
    /// Heading count at which the section signal saturates
    pub target_headings: f64,
    /// References plus links per 1000 words at which citations saturate
    pub target_reference_density: f64,
    /// Share of depth carried by length; the rest comes from headings
    pub length_share: f64,
}

impl Default for StructureThresholds {
    fn default() -> Self {
        Self {
            target_words: 1500.0,
            target_headings: 6.0,
            target_reference_density: 10.0,
            length_share: 0.6,
        }
    }
}

impl StructureThresholds {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.target_words > 0.0 && self.target_words.is_finite()) {
            return Err(EngineError::config("Target words must be positive"));
        }
        if !(self.target_headings > 0.0 && self.target_headings.is_finite()) {
            return Err(EngineError::config("Target headings must be positive"));
        }
        if !(self.target_reference_density > 0.0 && self.target_reference_density.is_finite()) {
            return Err(EngineError::config(
                "Target reference density must be positive",
            ));
        }
        if !in_unit_interval(self.length_share) {
            return Err(EngineError::config("Length share must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Quality scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub weights: MetricWeights,
    pub accuracy: AccuracyTable,
    /// Sentence length with full readability
    pub readability_baseline: f64,
    /// Extra words per sentence over which readability falls to zero
    pub readability_span: f64,
    /// Opinion markers matched case-insensitively on word boundaries
    pub opinion_markers: Vec<String>,
    /// Objectivity lost per opinion marker hit
    pub opinion_penalty: f64,
    pub structure: StructureThresholds,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            weights: MetricWeights::default(),
            accuracy: AccuracyTable::default(),
            readability_baseline: 15.0,
            readability_span: 30.0,
            opinion_markers: [
                "best",
                "worst",
                "terrible",
                "amazing",
                "awful",
                "obviously",
                "clearly",
                "undoubtedly",
                "everyone knows",
                "of course",
            ]
            .iter()
            .map(|marker| marker.to_string())
            .collect(),
            opinion_penalty: 0.1,
            structure: StructureThresholds::default(),
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.weights.validate()?;
        self.accuracy.validate()?;
        self.structure.validate()?;

        if !self.readability_baseline.is_finite() {
            return Err(EngineError::config("Readability baseline must be finite"));
        }
        if !(self.readability_span > 0.0 && self.readability_span.is_finite()) {
            return Err(EngineError::config("Readability span must be positive"));
        }
        if !(self.opinion_penalty >= 0.0 && self.opinion_penalty.is_finite()) {
            return Err(EngineError::config(
                "Opinion penalty must be non-negative",
            ));
        }
        if self.opinion_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(EngineError::config("Opinion markers cannot be empty"));
        }
        Ok(())
    }
}

/// Weights must be non-negative and sum to 1
pub(crate) fn validate_weights(label: &str, weights: &[f64]) -> EngineResult<()> {
    if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
        return Err(EngineError::config(format!(
            "{} must be non-negative",
            label
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(EngineError::config(format!(
            "{} must sum to 1.0, got {}",
            label, sum
        )));
    }
    Ok(())
}

fn in_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
