//! Common types used throughout the rating and attribution engine

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use skillratings::glicko2::Glicko2Rating;
use skillratings::Outcomes;
use std::collections::BTreeMap;

/// Stable identifier of a knowledge source, supplied by the registry
pub type SourceId = String;

/// Fetched article bodies for one topic, keyed by source
pub type ContentSet = BTreeMap<SourceId, String>;

/// Skill estimate of a source on the display scale (centre 1500)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    /// Skill estimate
    pub mu: f64,
    /// Rating deviation (uncertainty)
    pub phi: f64,
    /// Volatility
    pub sigma: f64,
}

impl Default for RatingState {
    fn default() -> Self {
        Self {
            mu: 1500.0,
            phi: 350.0,
            sigma: 0.06,
        }
    }
}

impl RatingState {
    pub fn new(mu: f64, phi: f64, sigma: f64) -> Self {
        Self { mu, phi, sigma }
    }

    /// Reject states that would poison an update
    ///
    /// `label` names the offending side in the error (e.g. `rating_a`).
    pub fn validate(&self, label: &str) -> EngineResult<()> {
        if !self.mu.is_finite() {
            return Err(EngineError::invalid(
                format!("{}.mu", label),
                format!("must be finite, got {}", self.mu),
            ));
        }
        if !self.phi.is_finite() || self.phi <= 0.0 {
            return Err(EngineError::invalid(
                format!("{}.phi", label),
                format!("must be positive and finite, got {}", self.phi),
            ));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(EngineError::invalid(
                format!("{}.sigma", label),
                format!("must be positive and finite, got {}", self.sigma),
            ));
        }
        Ok(())
    }
}

impl From<Glicko2Rating> for RatingState {
    fn from(rating: Glicko2Rating) -> Self {
        Self {
            mu: rating.rating,
            phi: rating.deviation,
            sigma: rating.volatility,
        }
    }
}

impl From<RatingState> for Glicko2Rating {
    fn from(state: RatingState) -> Self {
        Self {
            rating: state.mu,
            deviation: state.phi,
            volatility: state.sigma,
        }
    }
}

/// Result of a single vote between two sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    WinA,
    WinB,
    Tie,
}

impl MatchResult {
    /// Score realised by source A
    pub fn score_a(self) -> f64 {
        match self {
            MatchResult::WinA => 1.0,
            MatchResult::WinB => 0.0,
            MatchResult::Tie => 0.5,
        }
    }

    /// Score realised by source B
    pub fn score_b(self) -> f64 {
        1.0 - self.score_a()
    }

    /// Label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::WinA => "win_a",
            MatchResult::WinB => "win_b",
            MatchResult::Tie => "tie",
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MatchResult> for Outcomes {
    fn from(result: MatchResult) -> Self {
        match result {
            MatchResult::WinA => Outcomes::WIN,
            MatchResult::WinB => Outcomes::LOSS,
            MatchResult::Tie => Outcomes::DRAW,
        }
    }
}

/// A resolved vote, produced by the voting collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub source_a_id: SourceId,
    pub source_b_id: SourceId,
    pub result: MatchResult,
}

/// Soft failures surfaced alongside an otherwise usable update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateWarning {
    /// The volatility solver ran out of iterations; the prior sigma was kept
    VolatilityNotConverged { side: Side, iterations: u32 },
}

/// Which participant of a match a value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

/// Updated ratings for both participants of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPair {
    pub rating_a: RatingState,
    pub rating_b: RatingState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UpdateWarning>,
}

impl RatingPair {
    /// True when both volatilities were solved
    pub fn converged(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Symmetric confidence band around a rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingInterval {
    pub low: f64,
    pub high: f64,
}

/// Per-source content quality, every metric in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub accuracy: f64,
    pub readability: f64,
    pub depth: f64,
    pub objectivity: f64,
    pub citations: f64,
}

impl QualityMetrics {
    /// Metrics in weight-table order
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.accuracy,
            self.readability,
            self.depth,
            self.objectivity,
            self.citations,
        ]
    }
}

/// Persisted row for one source, shaped by the engine's types
///
/// Storage is owned by the collaborator, which must serialize
/// read-modify-write cycles per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_id: SourceId,
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(default)]
    pub total_wins: u64,
    #[serde(default)]
    pub total_losses: u64,
    #[serde(default)]
    pub total_ties: u64,
}

impl SourceRecord {
    /// Create a record for a newly registered source
    pub fn new(source_id: impl Into<SourceId>, initial: RatingState) -> Self {
        Self {
            source_id: source_id.into(),
            rating: initial.mu,
            rating_deviation: initial.phi,
            volatility: initial.sigma,
            total_matches: 0,
            total_wins: 0,
            total_losses: 0,
            total_ties: 0,
        }
    }

    pub fn rating_state(&self) -> RatingState {
        RatingState {
            mu: self.rating,
            phi: self.rating_deviation,
            sigma: self.volatility,
        }
    }

    /// Fraction of matches won, zero before the first match
    pub fn win_rate(&self) -> f64 {
        self.total_wins as f64 / self.total_matches.max(1) as f64
    }

    /// Replace the rating state and advance the counters for one match
    pub fn record_match(&mut self, new_state: RatingState, score: f64) {
        self.rating = new_state.mu;
        self.rating_deviation = new_state.phi;
        self.volatility = new_state.sigma;
        self.total_matches += 1;
        if score > 0.5 {
            self.total_wins += 1;
        } else if score < 0.5 {
            self.total_losses += 1;
        } else {
            self.total_ties += 1;
        }
    }
}

/// Ranking output for one source, consumed by the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub source_id: SourceId,
    pub metrics: QualityMetrics,
    pub overall_score: f64,
    pub shapley_value: f64,
    pub normalized_rating: f64,
    pub normalized_win_rate: f64,
    pub expected_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rating_state() {
        let state = RatingState::default();
        assert_eq!(state.mu, 1500.0);
        assert_eq!(state.phi, 350.0);
        assert_eq!(state.sigma, 0.06);
        assert!(state.validate("state").is_ok());
    }

    #[test]
    fn test_rating_state_validation() {
        let err = RatingState::new(f64::NAN, 200.0, 0.06)
            .validate("rating_a")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "rating_a.mu"));

        assert!(RatingState::new(1500.0, 0.0, 0.06)
            .validate("rating_a")
            .is_err());
        assert!(RatingState::new(1500.0, 200.0, -0.1)
            .validate("rating_b")
            .is_err());
        assert!(RatingState::new(1500.0, f64::INFINITY, 0.06)
            .validate("rating_b")
            .is_err());
    }

    #[test]
    fn test_glicko2_rating_conversion() {
        let state = RatingState::new(1620.0, 80.0, 0.059);
        let converted: Glicko2Rating = state.into();
        assert_eq!(converted.rating, 1620.0);
        assert_eq!(converted.deviation, 80.0);

        let back: RatingState = converted.into();
        assert_eq!(back, state);
    }

    #[test]
    fn test_match_result_scores() {
        assert_eq!(MatchResult::WinA.score_a(), 1.0);
        assert_eq!(MatchResult::WinA.score_b(), 0.0);
        assert_eq!(MatchResult::WinB.score_a(), 0.0);
        assert_eq!(MatchResult::Tie.score_a(), 0.5);
        assert_eq!(MatchResult::Tie.score_b(), 0.5);
    }

    #[test]
    fn test_match_outcome_json() {
        let json = r#"{"source_a_id":"wikipedia","source_b_id":"britannica","result":"win_b"}"#;
        let outcome: MatchOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.result, MatchResult::WinB);
    }

    #[test]
    fn test_source_record_counters() {
        let mut record = SourceRecord::new("wikipedia", RatingState::default());
        assert_eq!(record.win_rate(), 0.0);

        let next = RatingState::new(1580.0, 290.0, 0.06);
        record.record_match(next, 1.0);
        record.record_match(next, 0.5);
        record.record_match(next, 0.0);

        assert_eq!(record.total_matches, 3);
        assert_eq!(record.total_wins, 1);
        assert_eq!(record.total_ties, 1);
        assert_eq!(record.total_losses, 1);
        assert_eq!(record.rating_state(), next);
        assert!((record.win_rate() - 1.0 / 3.0).abs() < 1e-12);
    }
}
