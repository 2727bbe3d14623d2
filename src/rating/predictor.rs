//! Outcome prediction from rating states
//!
//! All inputs and outputs are on the display scale.

use crate::rating::glicko::{expectation, to_glicko2_mu, to_glicko2_phi};
use crate::types::{RatingInterval, RatingState};

/// Probability that a player rated `mu_a` beats an opponent rated
/// `mu_b` with deviation `phi_b`
pub fn expected_score(mu_a: f64, mu_b: f64, phi_b: f64) -> f64 {
    expectation(to_glicko2_mu(mu_a), to_glicko2_mu(mu_b), to_glicko2_phi(phi_b))
}

/// Probability that `rating_a` beats `rating_b`, B taken as the fixed opponent
pub fn predict_outcome(rating_a: &RatingState, rating_b: &RatingState) -> f64 {
    expected_score(rating_a.mu, rating_b.mu, rating_b.phi)
}

/// Symmetric band `mu ± multiplier · phi`
pub fn rating_interval(rating: &RatingState, multiplier: f64) -> RatingInterval {
    RatingInterval {
        low: rating.mu - multiplier * rating.phi,
        high: rating.mu + multiplier * rating.phi,
    }
}

/// Lower bound of the rating interval, for uncertainty-aware ordering
pub fn conservative_rating(rating: &RatingState, multiplier: f64) -> f64 {
    rating_interval(rating, multiplier).low
}
