//! Arena Engine - Rating and attribution core for a source comparison arena
//!
//! This crate rates knowledge sources from pairwise votes with Glicko-2,
//! scores article quality, attributes blended quality with Shapley values,
//! and ranks sources by an expected value blend.

pub mod attribution;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod quality;
pub mod ranking;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{EngineError, EngineResult, Result};
pub use types::*;

// Re-export key components
pub use attribution::{calculate_shapley_values, Coalition, CoalitionBlend};
pub use config::EngineConfig;
pub use engine::RatingEngine;
pub use quality::QualityScorer;
pub use ranking::compute_expected_value;
pub use rating::{Glicko2Calculator, RatingCalculator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
