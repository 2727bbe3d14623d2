//! Rating system configuration

use crate::error::{EngineError, EngineResult};
use crate::types::RatingState;
use serde::{Deserialize, Serialize};

/// Glicko-2 parameters threaded into every rating operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned to newly registered sources
    pub initial_rating: f64,
    /// Deviation assigned to newly registered sources, also the decay cap
    pub initial_deviation: f64,
    /// Volatility assigned to newly registered sources
    pub initial_volatility: f64,
    /// Volatility-change constraint, usually 0.3 to 1.2
    pub tau: f64,
    /// Bracket width at which the volatility solver stops
    pub convergence_epsilon: f64,
    /// Iteration budget shared by bracket search and refinement
    pub max_iterations: u32,
    /// Deviations on each side of mu reported by rating intervals
    pub interval_multiplier: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            initial_deviation: 350.0,
            initial_volatility: 0.06,
            tau: 0.5,
            convergence_epsilon: 1e-6,
            max_iterations: 100,
            interval_multiplier: 2.0,
        }
    }
}

impl RatingConfig {
    /// Create conservative configuration (volatility barely moves)
    pub fn conservative() -> Self {
        Self {
            tau: 0.3,
            ..Self::default()
        }
    }

    /// Create volatile configuration (volatility reacts to upsets)
    pub fn volatile() -> Self {
        Self {
            tau: 1.2,
            ..Self::default()
        }
    }

    /// State assigned to a source at registration
    pub fn initial_state(&self) -> RatingState {
        RatingState {
            mu: self.initial_rating,
            phi: self.initial_deviation,
            sigma: self.initial_volatility,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> EngineResult<()> {
        if !self.initial_rating.is_finite() {
            return Err(EngineError::config("Initial rating must be finite"));
        }
        if !(self.initial_deviation > 0.0 && self.initial_deviation.is_finite()) {
            return Err(EngineError::config("Initial deviation must be positive"));
        }
        if !(self.initial_volatility > 0.0 && self.initial_volatility.is_finite()) {
            return Err(EngineError::config("Initial volatility must be positive"));
        }
        if !(self.tau > 0.0 && self.tau.is_finite()) {
            return Err(EngineError::config("Tau must be positive"));
        }
        if !(self.convergence_epsilon > 0.0 && self.convergence_epsilon.is_finite()) {
            return Err(EngineError::config("Convergence epsilon must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::config(
                "Max iterations must be greater than 0",
            ));
        }
        if !(self.interval_multiplier > 0.0 && self.interval_multiplier.is_finite()) {
            return Err(EngineError::config("Interval multiplier must be positive"));
        }
        Ok(())
    }
}
