//! Expected value blend used to order the leaderboard

use crate::config::{RankingConfig, ValueWeights};
use crate::utils::{clamp01, linear_scale};

/// Blend quality, normalized rating and normalized win rate into one scalar
pub fn compute_expected_value(
    quality: f64,
    normalized_rating: f64,
    normalized_win_rate: f64,
    weights: &ValueWeights,
) -> f64 {
    weights.quality * quality
        + weights.rating * normalized_rating
        + weights.win_rate * normalized_win_rate
}

/// Map a display rating onto `[0, 1]` over the configured range
pub fn normalize_rating(mu: f64, config: &RankingConfig) -> f64 {
    linear_scale(mu, config.rating_floor, config.rating_ceiling)
}

/// `wins / max(total, 1)`
pub fn normalize_win_rate(wins: u64, total_matches: u64) -> f64 {
    clamp01(wins as f64 / total_matches.max(1) as f64)
}
