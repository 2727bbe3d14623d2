//! Main engine configuration
//!
//! This module defines the top-level configuration for the arena engine,
//! including TOML file loading, environment variable overrides and
//! validation. Every engine operation receives its settings from here.

use crate::config::{AttributionConfig, QualityConfig, RankingConfig, RatingConfig};
use crate::config::quality::AccuracyMatching;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub quality: QualityConfig,
    pub attribution: AttributionConfig,
    pub ranking: RankingConfig,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in logs
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "arena-engine".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        apply_overrides(&mut config, |key| env::var(key).ok())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        apply_overrides(&mut config, |key| env::var(key).ok())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }
}

/// Apply `ARENA_*` overrides from `lookup` on top of `config`
pub fn apply_overrides<F>(config: &mut EngineConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Service settings
    if let Some(name) = lookup("ARENA_SERVICE_NAME") {
        config.service.name = name;
    }
    if let Some(log_level) = lookup("ARENA_LOG_LEVEL") {
        config.service.log_level = log_level;
    }

    // Rating settings
    override_parsed(&lookup, "ARENA_INITIAL_RATING", &mut config.rating.initial_rating)?;
    override_parsed(
        &lookup,
        "ARENA_INITIAL_DEVIATION",
        &mut config.rating.initial_deviation,
    )?;
    override_parsed(
        &lookup,
        "ARENA_INITIAL_VOLATILITY",
        &mut config.rating.initial_volatility,
    )?;
    override_parsed(&lookup, "ARENA_TAU", &mut config.rating.tau)?;
    override_parsed(
        &lookup,
        "ARENA_CONVERGENCE_EPSILON",
        &mut config.rating.convergence_epsilon,
    )?;
    override_parsed(&lookup, "ARENA_MAX_ITERATIONS", &mut config.rating.max_iterations)?;
    override_parsed(
        &lookup,
        "ARENA_INTERVAL_MULTIPLIER",
        &mut config.rating.interval_multiplier,
    )?;

    // Quality settings
    if let Some(matching) = lookup("ARENA_ACCURACY_MATCHING") {
        config.quality.accuracy.matching = match matching.to_lowercase().as_str() {
            "exact" => AccuracyMatching::Exact,
            "substring" => AccuracyMatching::Substring,
            _ => return Err(anyhow!("Invalid ARENA_ACCURACY_MATCHING value: {}", matching)),
        };
    }
    override_parsed(
        &lookup,
        "ARENA_OPINION_PENALTY",
        &mut config.quality.opinion_penalty,
    )?;

    // Attribution and ranking settings
    override_parsed(&lookup, "ARENA_MAX_SOURCES", &mut config.attribution.max_sources)?;
    override_parsed(&lookup, "ARENA_RATING_FLOOR", &mut config.ranking.rating_floor)?;
    override_parsed(
        &lookup,
        "ARENA_RATING_CEILING",
        &mut config.ranking.rating_ceiling,
    )?;

    Ok(())
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, raw))?;
    }
    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &EngineConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.quality.validate()?;
    config.attribution.validate()?;
    config.ranking.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.name, "arena-engine");
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = EngineConfig::default();
        let lookup = lookup_from(&[
            ("ARENA_TAU", "0.9"),
            ("ARENA_MAX_ITERATIONS", "25"),
            ("ARENA_ACCURACY_MATCHING", "Substring"),
            ("ARENA_LOG_LEVEL", "debug"),
            ("ARENA_MAX_SOURCES", "8"),
        ]);

        apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.rating.tau, 0.9);
        assert_eq!(config.rating.max_iterations, 25);
        assert_eq!(config.quality.accuracy.matching, AccuracyMatching::Substring);
        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.attribution.max_sources, 8);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = EngineConfig::default();
        let err = apply_overrides(&mut config, lookup_from(&[("ARENA_TAU", "fast")])).unwrap_err();
        assert!(err.to_string().contains("ARENA_TAU"));

        let mut config = EngineConfig::default();
        assert!(apply_overrides(
            &mut config,
            lookup_from(&[("ARENA_ACCURACY_MATCHING", "fuzzy")])
        )
        .is_err());
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = EngineConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = EngineConfig::default();
        config.rating.tau = -0.5;
        assert!(validate_config(&config).is_err());

        let mut config = EngineConfig::default();
        config.ranking.weights.quality = 0.9;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let config = EngineConfig::from_toml_str(
            r#"
            [rating]
            tau = 0.75
            max_iterations = 50

            [attribution]
            max_sources = 6
            blend = "max"

            [[quality.accuracy.entries]]
            source = "encyclopedia-x"
            accuracy = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(config.rating.tau, 0.75);
        assert_eq!(config.rating.initial_rating, 1500.0);
        assert_eq!(config.attribution.max_sources, 6);
        assert_eq!(config.quality.accuracy.entries.len(), 1);
        assert_eq!(config.quality.accuracy.entries[0].source, "encyclopedia-x");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_from_file_missing() {
        let err = EngineConfig::from_file("/nonexistent/arena.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
