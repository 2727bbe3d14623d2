//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use arena_engine::config::EngineConfig;
use arena_engine::error::EngineResult;
use arena_engine::rating::{Glicko2Calculator, RatingCalculator};
use arena_engine::types::{
    ContentSet, MatchResult, RatingInterval, RatingPair, RatingState, SourceId, SourceRecord,
};
use arena_engine::RatingEngine;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Long, sectioned, well-referenced encyclopedia entry
pub const BRITANNICA_ARTICLE: &str = "\
## Overview
The Peace of Westphalia is the collective name for two peace treaties signed in 1648 [1]. \
The treaties ended the Thirty Years' War and the Eighty Years' War [2]. \
They brought peace to the Holy Roman Empire after decades of conflict [3].

## Negotiations
Delegates met in the cities of Osnabrueck and Muenster over several years [4]. \
The talks involved representatives of many states and free cities [5].

## Legacy
Historians often describe the settlement as the origin of state sovereignty [6]. \
Later scholarship has questioned how much the treaties changed in practice [7].
";

/// Shorter community article with a few references
pub const WIKIPEDIA_ARTICLE: &str = "\
== Background ==
The Peace of Westphalia was signed in 1648 [1]. It ended two long wars in Europe. \
The treaties were negotiated in two cities.

== Consequences ==
The settlement reshaped the map of central Europe [2].
";

/// Opinionated post with no structure or citations
pub const BLOG_ARTICLE: &str = "Obviously the Peace of Westphalia was the best treaty ever written. \
Everyone knows it was clearly amazing and of course nothing else compares. \
The other treaties were terrible and awful.";

/// Engine with default configuration
pub fn test_engine() -> RatingEngine {
    RatingEngine::new(EngineConfig::default()).expect("default config is valid")
}

/// One topic fetched from three sources
pub fn sample_contents() -> ContentSet {
    let mut contents = ContentSet::new();
    contents.insert("britannica".to_string(), BRITANNICA_ARTICLE.to_string());
    contents.insert("wikipedia".to_string(), WIKIPEDIA_ARTICLE.to_string());
    contents.insert("blog".to_string(), BLOG_ARTICLE.to_string());
    contents
}

/// Freshly registered records for every source in `contents`
pub fn fresh_records(engine: &RatingEngine, contents: &ContentSet) -> BTreeMap<SourceId, SourceRecord> {
    contents
        .keys()
        .map(|id| (id.clone(), engine.register_source(id.clone())))
        .collect()
}

/// Calculator that records every update it is asked to perform
#[derive(Debug)]
pub struct RecordingCalculator {
    inner: Glicko2Calculator,
    calls: Arc<Mutex<Vec<MatchResult>>>,
}

impl RecordingCalculator {
    pub fn new() -> Self {
        Self {
            inner: Glicko2Calculator::new(Default::default()).expect("default config is valid"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded results
    pub fn calls(&self) -> Arc<Mutex<Vec<MatchResult>>> {
        self.calls.clone()
    }
}

impl RatingCalculator for RecordingCalculator {
    fn update(
        &self,
        rating_a: &RatingState,
        rating_b: &RatingState,
        result: MatchResult,
    ) -> EngineResult<RatingPair> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(result);
        }
        self.inner.update(rating_a, rating_b, result)
    }

    fn predict_outcome(&self, rating_a: &RatingState, rating_b: &RatingState) -> EngineResult<f64> {
        self.inner.predict_outcome(rating_a, rating_b)
    }

    fn rating_interval(&self, rating: &RatingState) -> EngineResult<RatingInterval> {
        self.inner.rating_interval(rating)
    }

    fn initial_rating(&self) -> RatingState {
        self.inner.initial_rating()
    }

    fn config(&self) -> serde_json::Value {
        self.inner.config()
    }

    fn update_config(&mut self, config: serde_json::Value) -> EngineResult<()> {
        self.inner.update_config(config)
    }
}
