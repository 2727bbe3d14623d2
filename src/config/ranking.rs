//! Ranking and attribution configuration

use crate::attribution::CoalitionBlend;
use crate::config::quality::validate_weights;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Hard ceiling on exhaustive enumeration, 2^20 coalitions
pub const MAX_ENUMERABLE_SOURCES: usize = 20;

/// Weights of the expected value blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueWeights {
    pub quality: f64,
    pub rating: f64,
    pub win_rate: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self {
            quality: 0.40,
            rating: 0.35,
            win_rate: 0.25,
        }
    }
}

impl ValueWeights {
    pub fn validate(&self) -> EngineResult<()> {
        validate_weights(
            "ranking.weights",
            &[self.quality, self.rating, self.win_rate],
        )
    }
}

/// Expected value combiner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: ValueWeights,
    /// Rating mapped to 0.0
    pub rating_floor: f64,
    /// Rating mapped to 1.0
    pub rating_ceiling: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: ValueWeights::default(),
            rating_floor: 1000.0,
            rating_ceiling: 2000.0,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.weights.validate()?;
        if !(self.rating_floor.is_finite() && self.rating_ceiling.is_finite()) {
            return Err(EngineError::config("Rating range must be finite"));
        }
        if self.rating_ceiling <= self.rating_floor {
            return Err(EngineError::config(
                "Rating ceiling must be greater than rating floor",
            ));
        }
        Ok(())
    }
}

/// Shapley attribution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Largest coalition enumerated exhaustively
    pub max_sources: usize,
    /// How per-source overall scores combine into a coalition value
    pub blend: CoalitionBlend,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            max_sources: 12,
            blend: CoalitionBlend::Union,
        }
    }
}

impl AttributionConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_sources == 0 {
            return Err(EngineError::config("Max sources must be greater than 0"));
        }
        if self.max_sources > MAX_ENUMERABLE_SOURCES {
            return Err(EngineError::config(format!(
                "Max sources cannot exceed {}",
                MAX_ENUMERABLE_SOURCES
            )));
        }
        Ok(())
    }
}
