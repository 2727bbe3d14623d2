//! Shapley value attribution across sources
//!
//! This module decomposes the quality reachable by a coalition of sources
//! into each source's average marginal contribution.

pub mod coalition;
pub mod shapley;

// Re-export commonly used types
pub use coalition::{blended_value, Coalition, CoalitionBlend};
pub use shapley::{attribute_quality, calculate_shapley_values};
