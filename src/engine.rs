//! Engine facade used by collaborators
//!
//! [`RatingEngine`] binds one validated [`EngineConfig`] to the rating,
//! scoring, attribution and ranking functions so callers never rely on
//! ambient defaults. It holds no rating state of its own: the persistence
//! collaborator reads [`SourceRecord`]s, hands them in, and writes back the
//! results, serializing updates per source.

use crate::attribution::{attribute_quality, calculate_shapley_values, Coalition};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::metrics::EngineMetrics;
use crate::quality::QualityScorer;
use crate::rating::{Glicko2Calculator, RatingCalculator};
use crate::ranking::{compute_expected_value, normalize_rating, normalize_win_rate};
use crate::types::{
    ContentSet, MatchOutcome, MatchResult, QualityMetrics, QualityReport, RatingInterval,
    RatingPair, RatingState, SourceId, SourceRecord,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rating and attribution engine
pub struct RatingEngine {
    config: EngineConfig,
    calculator: Box<dyn RatingCalculator>,
    scorer: QualityScorer,
    metrics: Option<Arc<EngineMetrics>>,
}

impl std::fmt::Debug for RatingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingEngine")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl RatingEngine {
    /// Create an engine with the Glicko-2 calculator and default structure scoring
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.attribution.validate()?;
        config.ranking.validate()?;

        let calculator = Glicko2Calculator::new(config.rating.clone())?;
        let scorer = QualityScorer::new(config.quality.clone())?;

        Ok(Self {
            config,
            calculator: Box::new(calculator),
            scorer,
            metrics: None,
        })
    }

    /// Observe engine calls with the given metrics
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Replace the rating calculator
    pub fn with_calculator(mut self, calculator: Box<dyn RatingCalculator>) -> Self {
        self.calculator = calculator;
        self
    }

    /// Replace the quality scorer
    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&Arc<EngineMetrics>> {
        self.metrics.as_ref()
    }

    /// Rating assigned to a newly registered source
    pub fn initial_rating(&self) -> RatingState {
        self.calculator.initial_rating()
    }

    /// Record for a newly registered source
    pub fn register_source(&self, source_id: impl Into<SourceId>) -> SourceRecord {
        SourceRecord::new(source_id, self.initial_rating())
    }

    /// Update both sources after a vote
    pub fn update(
        &self,
        rating_a: &RatingState,
        rating_b: &RatingState,
        result: MatchResult,
    ) -> EngineResult<RatingPair> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());

        let pair = self
            .calculator
            .update(rating_a, rating_b, result)
            .map_err(|e| self.rejected("update", e))?;

        for warning in &pair.warnings {
            warn!(?warning, result = %result, "Rating update completed with warning");
        }
        debug!(
            result = %result,
            mu_a = pair.rating_a.mu,
            mu_b = pair.rating_b.mu,
            "Rating update applied"
        );

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_update(result, &pair, timer.stop());
        }

        Ok(pair)
    }

    /// Apply a resolved vote to both persisted records
    ///
    /// Records are only modified when the whole update succeeds.
    pub fn apply_outcome(
        &self,
        outcome: &MatchOutcome,
        record_a: &mut SourceRecord,
        record_b: &mut SourceRecord,
    ) -> EngineResult<RatingPair> {
        if record_a.source_id != outcome.source_a_id {
            return Err(self.rejected(
                "apply_outcome",
                EngineError::invalid(
                    "record_a",
                    format!(
                        "expected {}, got {}",
                        outcome.source_a_id, record_a.source_id
                    ),
                ),
            ));
        }
        if record_b.source_id != outcome.source_b_id {
            return Err(self.rejected(
                "apply_outcome",
                EngineError::invalid(
                    "record_b",
                    format!(
                        "expected {}, got {}",
                        outcome.source_b_id, record_b.source_id
                    ),
                ),
            ));
        }
        if outcome.source_a_id == outcome.source_b_id {
            return Err(self.rejected(
                "apply_outcome",
                EngineError::invalid("outcome", "a source cannot play itself"),
            ));
        }

        let pair = self.update(
            &record_a.rating_state(),
            &record_b.rating_state(),
            outcome.result,
        )?;

        record_a.record_match(pair.rating_a, outcome.result.score_a());
        record_b.record_match(pair.rating_b, outcome.result.score_b());

        Ok(pair)
    }

    /// Probability that A beats B
    pub fn predict_outcome(&self, rating_a: &RatingState, rating_b: &RatingState) -> EngineResult<f64> {
        self.calculator
            .predict_outcome(rating_a, rating_b)
            .map_err(|e| self.rejected("predict_outcome", e))
    }

    /// Confidence band around a rating
    pub fn rating_interval(&self, rating: &RatingState) -> EngineResult<RatingInterval> {
        self.calculator
            .rating_interval(rating)
            .map_err(|e| self.rejected("rating_interval", e))
    }

    /// Score one article for the declared source
    pub fn score(&self, content: &str, source_id: &str) -> QualityMetrics {
        let metrics = self.scorer.score(content, source_id);
        if let Some(m) = &self.metrics {
            m.record_scored(1);
        }
        metrics
    }

    /// Overall score with the configured weights
    pub fn overall_score(&self, metrics: &QualityMetrics) -> f64 {
        self.scorer.overall_score(metrics)
    }

    /// Shapley value of every source under a caller-supplied value function
    pub fn calculate_shapley_values<F>(
        &self,
        value: F,
        sources: &[SourceId],
    ) -> EngineResult<BTreeMap<SourceId, f64>>
    where
        F: Fn(&Coalition<'_>) -> f64,
    {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());

        let attribution = calculate_shapley_values(value, sources, self.config.attribution.max_sources)
            .map_err(|e| self.rejected("calculate_shapley_values", e))?;

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_attribution(sources.len(), timer.stop());
        }

        Ok(attribution)
    }

    /// Blend quality, normalized rating and normalized win rate
    pub fn compute_expected_value(
        &self,
        quality: f64,
        normalized_rating: f64,
        normalized_win_rate: f64,
    ) -> f64 {
        compute_expected_value(
            quality,
            normalized_rating,
            normalized_win_rate,
            &self.config.ranking.weights,
        )
    }

    /// Score, attribute and rank every source in a content set
    ///
    /// Sources without a record are treated as newly registered. Reports are
    /// sorted by expected value, best first, ties broken by source id.
    pub fn rank(
        &self,
        contents: &ContentSet,
        records: &BTreeMap<SourceId, SourceRecord>,
    ) -> EngineResult<Vec<QualityReport>> {
        for (source_id, record) in records {
            record
                .rating_state()
                .validate(&format!("records[{}]", source_id))
                .map_err(|e| self.rejected("rank", e))?;
        }

        let metrics = self.scorer.score_all(contents);
        if let Some(m) = &self.metrics {
            m.record_scored(metrics.len());
        }

        let overall: BTreeMap<SourceId, f64> = metrics
            .iter()
            .map(|(source_id, m)| (source_id.clone(), self.scorer.overall_score(m)))
            .collect();

        let timer = self.metrics.as_ref().map(|m| m.start_timer());
        let shapley = attribute_quality(&overall, &self.config.attribution)
            .map_err(|e| self.rejected("rank", e))?;
        if let (Some(m), Some(timer)) = (&self.metrics, timer) {
            m.record_attribution(overall.len(), timer.stop());
        }

        let mut reports: Vec<QualityReport> = metrics
            .into_iter()
            .map(|(source_id, quality)| {
                let (rating, wins, matches) = match records.get(&source_id) {
                    Some(record) => (record.rating, record.total_wins, record.total_matches),
                    None => (self.initial_rating().mu, 0, 0),
                };
                let overall_score = self.scorer.overall_score(&quality);
                let normalized_rating = normalize_rating(rating, &self.config.ranking);
                let normalized_win_rate = normalize_win_rate(wins, matches);

                QualityReport {
                    shapley_value: shapley.get(&source_id).copied().unwrap_or(0.0),
                    expected_value: self.compute_expected_value(
                        overall_score,
                        normalized_rating,
                        normalized_win_rate,
                    ),
                    source_id,
                    metrics: quality,
                    overall_score,
                    normalized_rating,
                    normalized_win_rate,
                }
            })
            .collect();

        reports.sort_by(|a, b| {
            b.expected_value
                .partial_cmp(&a.expected_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.source_id.cmp(&b.source_id))
        });

        debug!(sources = reports.len(), "Ranked sources");
        Ok(reports)
    }

    fn rejected(&self, operation: &str, error: EngineError) -> EngineError {
        debug!(operation, %error, "Engine call rejected");
        if let Some(m) = &self.metrics {
            m.record_rejection(operation, &error);
        }
        error
    }
}
