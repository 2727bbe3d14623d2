//! Rating system built on Glicko-2
//!
//! This module provides pairwise rating updates with a bounded volatility
//! solver, the multi-opponent rating period they build on, and outcome
//! prediction from rating states.

pub mod calculator;
pub mod glicko;
pub mod predictor;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use glicko::{
    decay, inflated_deviation, period_statistics, solve_volatility, update, update_period,
    Glicko2Calculator, PeriodResult, PeriodStatistics, PeriodUpdate, VolatilitySolution,
};
pub use predictor::{conservative_rating, expected_score, predict_outcome, rating_interval};
