//! Configuration management for the arena engine
//!
//! Every default the engine relies on (initial ratings, tau, solver budget,
//! metric weights, accuracy table) lives in an explicit configuration value
//! that callers thread into each operation.

pub mod app;
pub mod quality;
pub mod ranking;
pub mod rating;

// Re-export commonly used types
pub use app::{apply_overrides, validate_config, EngineConfig, ServiceSettings};
pub use quality::{
    AccuracyEntry, AccuracyMatching, AccuracyTable, MetricWeights, QualityConfig,
    StructureThresholds,
};
pub use ranking::{AttributionConfig, RankingConfig, ValueWeights, MAX_ENUMERABLE_SOURCES};
pub use rating::RatingConfig;
