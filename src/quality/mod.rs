//! Content quality scoring
//!
//! This module turns article text into per-source quality metrics and the
//! weighted overall score used by attribution and ranking.

pub mod scorer;
pub mod structure;

// Re-export commonly used types
pub use scorer::{overall_score, QualityScorer};
pub use structure::{ContentStats, SaturatingStructure, StructuralScorer};
