//! Rating calculator trait
//!
//! This module defines the interface the engine uses for pairwise rating
//! updates and outcome prediction, so alternate rating systems can be
//! swapped in behind the same facade.

use crate::error::EngineResult;
use crate::types::{MatchResult, RatingInterval, RatingPair, RatingState};

/// Trait for calculating rating changes after votes
pub trait RatingCalculator: Send + Sync {
    /// Update both participants of a resolved vote
    ///
    /// # Arguments
    /// * `rating_a` - Pre-match rating of source A
    /// * `rating_b` - Pre-match rating of source B
    /// * `result` - Outcome from A's point of view
    ///
    /// # Returns
    /// Both updated ratings plus any soft warnings, or `InvalidInput`
    /// without touching either rating
    fn update(
        &self,
        rating_a: &RatingState,
        rating_b: &RatingState,
        result: MatchResult,
    ) -> EngineResult<RatingPair>;

    /// Probability that A beats B
    fn predict_outcome(&self, rating_a: &RatingState, rating_b: &RatingState) -> EngineResult<f64>;

    /// Confidence band around a rating
    fn rating_interval(&self, rating: &RatingState) -> EngineResult<RatingInterval>;

    /// Get the initial rating for new sources
    fn initial_rating(&self) -> RatingState;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> EngineResult<()>;
}
