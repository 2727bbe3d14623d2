//! Metrics collection using Prometheus
//!
//! The engine's computations are pure; these counters only observe calls
//! made through the [`RatingEngine`](crate::engine::RatingEngine) facade.

use crate::error::EngineError;
use crate::types::{MatchResult, RatingPair};
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prometheus metrics for engine operations
#[derive(Clone)]
pub struct EngineMetrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Rating updates applied, by match result
    pub updates_total: IntCounterVec,

    /// Volatility solves that ran out of iterations
    pub convergence_failures_total: IntCounter,

    /// Calls rejected before computing, by operation and error kind
    pub rejected_total: IntCounterVec,

    /// Articles scored
    pub contents_scored_total: IntCounter,

    /// Coalitions enumerated by Shapley attribution
    pub coalitions_evaluated_total: IntCounter,

    /// Rating update duration
    pub update_duration: Histogram,

    /// Shapley attribution duration
    pub attribution_duration: Histogram,
}

impl EngineMetrics {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let updates_total = IntCounterVec::new(
            Opts::new("arena_rating_updates_total", "Rating updates applied"),
            &["result"],
        )?;
        registry.register(Box::new(updates_total.clone()))?;

        let convergence_failures_total = IntCounter::new(
            "arena_volatility_convergence_failures_total",
            "Volatility solves that exhausted their iteration budget",
        )?;
        registry.register(Box::new(convergence_failures_total.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new("arena_rejected_total", "Engine calls rejected before computing"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let contents_scored_total =
            IntCounter::new("arena_contents_scored_total", "Articles scored for quality")?;
        registry.register(Box::new(contents_scored_total.clone()))?;

        let coalitions_evaluated_total = IntCounter::new(
            "arena_coalitions_evaluated_total",
            "Coalitions enumerated during Shapley attribution",
        )?;
        registry.register(Box::new(coalitions_evaluated_total.clone()))?;

        let update_duration = Histogram::with_opts(
            HistogramOpts::new(
                "arena_rating_update_duration_seconds",
                "Rating update duration",
            )
            .buckets(vec![0.000_001, 0.000_01, 0.000_1, 0.001, 0.01]),
        )?;
        registry.register(Box::new(update_duration.clone()))?;

        let attribution_duration = Histogram::with_opts(
            HistogramOpts::new(
                "arena_attribution_duration_seconds",
                "Shapley attribution duration",
            )
            .buckets(vec![0.000_01, 0.000_1, 0.001, 0.01, 0.1, 1.0]),
        )?;
        registry.register(Box::new(attribution_duration.clone()))?;

        Ok(Self {
            registry,
            updates_total,
            convergence_failures_total,
            rejected_total,
            contents_scored_total,
            coalitions_evaluated_total,
            update_duration,
            attribution_duration,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record an applied rating update
    pub fn record_update(&self, result: MatchResult, pair: &RatingPair, duration: Duration) {
        self.updates_total
            .with_label_values(&[result.as_str()])
            .inc();
        self.convergence_failures_total
            .inc_by(pair.warnings.len() as u64);
        self.update_duration.observe(duration.as_secs_f64());
    }

    /// Record a call rejected with an error
    pub fn record_rejection(&self, operation: &str, error: &EngineError) {
        self.rejected_total
            .with_label_values(&[operation, error.kind()])
            .inc();
    }

    /// Record scored articles
    pub fn record_scored(&self, count: usize) {
        self.contents_scored_total.inc_by(count as u64);
    }

    /// Record a completed attribution over `sources` sources
    pub fn record_attribution(&self, sources: usize, duration: Duration) {
        if sources > 0 {
            self.coalitions_evaluated_total
                .inc_by((1u64 << sources) - 1);
        }
        self.attribution_duration.observe(duration.as_secs_f64());
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}
