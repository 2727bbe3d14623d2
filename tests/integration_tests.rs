//! Integration tests for the arena engine
//!
//! These tests drive the public facade the way the web application does:
//! - Votes flowing into rating updates and persisted records
//! - Content sets flowing through scoring, attribution and ranking
//! - Configuration loaded from TOML text
//! - Concurrent use of one shared engine

mod fixtures;

use arena_engine::attribution::CoalitionBlend;
use arena_engine::config::EngineConfig;
use arena_engine::rating::{update_period, PeriodResult};
use arena_engine::types::{MatchOutcome, MatchResult, RatingState, UpdateWarning};
use arena_engine::{Coalition, EngineError, RatingEngine};
use std::collections::BTreeMap;
use std::sync::Arc;

use fixtures::{fresh_records, sample_contents, test_engine, RecordingCalculator};

fn vote(a: &str, b: &str, result: MatchResult) -> MatchOutcome {
    MatchOutcome {
        source_a_id: a.to_string(),
        source_b_id: b.to_string(),
        result,
    }
}

/// Apply an outcome to the records map in place
fn apply(
    engine: &RatingEngine,
    records: &mut BTreeMap<String, arena_engine::SourceRecord>,
    outcome: &MatchOutcome,
) {
    let mut a = records[&outcome.source_a_id].clone();
    let mut b = records[&outcome.source_b_id].clone();
    engine.apply_outcome(outcome, &mut a, &mut b).unwrap();
    records.insert(a.source_id.clone(), a);
    records.insert(b.source_id.clone(), b);
}

#[test]
fn test_votes_then_leaderboard() {
    let engine = test_engine();
    let contents = sample_contents();
    let mut records = fresh_records(&engine, &contents);

    // Step 1: a series of votes
    for _ in 0..3 {
        apply(&engine, &mut records, &vote("britannica", "blog", MatchResult::WinA));
        apply(&engine, &mut records, &vote("blog", "wikipedia", MatchResult::WinB));
    }
    apply(&engine, &mut records, &vote("britannica", "wikipedia", MatchResult::Tie));

    // Step 2: counters and ratings reflect the votes
    let britannica = &records["britannica"];
    assert_eq!(britannica.total_matches, 4);
    assert_eq!(britannica.total_wins, 3);
    assert_eq!(britannica.total_ties, 1);
    assert_eq!(records["blog"].total_losses, 6);
    assert!(britannica.rating > 1500.0);
    assert!(records["blog"].rating < 1500.0);
    for record in records.values() {
        assert!(record.rating_deviation > 0.0 && record.rating_deviation < 350.0);
        assert!(record.volatility > 0.0);
    }

    // Step 3: ranking
    let reports = engine.rank(&contents, &records).unwrap();
    let order: Vec<&str> = reports.iter().map(|r| r.source_id.as_str()).collect();
    assert_eq!(order.first(), Some(&"britannica"));
    assert_eq!(order.last(), Some(&"blog"));

    for report in &reports {
        for metric in report.metrics.as_array() {
            assert!((0.0..=1.0).contains(&metric));
        }
        assert!((0.0..=1.0).contains(&report.expected_value));
    }

    // Attribution splits exactly the blended quality of all sources
    let grand = CoalitionBlend::Union.combine(reports.iter().map(|r| r.overall_score));
    let total: f64 = reports.iter().map(|r| r.shapley_value).sum();
    assert!((total - grand).abs() < 1e-9);
}

#[test]
fn test_blog_scores_lowest_on_objectivity_and_citations() {
    let engine = test_engine();
    let contents = sample_contents();

    let blog = engine.score(&contents["blog"], "blog");
    let britannica = engine.score(&contents["britannica"], "britannica");

    assert!(blog.objectivity < britannica.objectivity);
    assert_eq!(blog.citations, 0.0);
    assert_eq!(britannica.accuracy, 0.85);
    assert_eq!(blog.accuracy, 0.70);
}

#[test]
fn test_ranking_is_deterministic() {
    let engine = test_engine();
    let contents = sample_contents();
    let records = fresh_records(&engine, &contents);

    let first = engine.rank(&contents, &records).unwrap();
    let second = test_engine().rank(&contents, &records).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_records_rank_as_new_sources() {
    let engine = test_engine();
    let contents = sample_contents();

    let with_fresh = engine
        .rank(&contents, &fresh_records(&engine, &contents))
        .unwrap();
    let without = engine.rank(&contents, &BTreeMap::new()).unwrap();

    assert_eq!(with_fresh, without);
}

#[test]
fn test_custom_coalition_value() {
    let engine = test_engine();
    let sources = vec!["A".to_string(), "B".to_string()];
    let value = |c: &Coalition<'_>| match (c.contains("A"), c.contains("B")) {
        (true, true) => 0.8,
        (true, false) => 0.6,
        (false, true) => 0.5,
        (false, false) => 0.0,
    };

    let phi = engine.calculate_shapley_values(value, &sources).unwrap();

    assert!((phi["A"] - 0.45).abs() < 1e-12);
    assert!((phi["B"] - 0.35).abs() < 1e-12);
}

#[test]
fn test_too_many_sources_rejected() {
    let engine = test_engine();
    let contents: arena_engine::ContentSet = (0..13)
        .map(|i| (format!("source-{:02}", i), "Plain text.".to_string()))
        .collect();

    let err = engine.rank(&contents, &BTreeMap::new()).unwrap_err();
    assert_eq!(
        err,
        EngineError::CoalitionTooLarge {
            sources: 13,
            max: 12
        }
    );
}

#[test]
fn test_config_from_toml_drives_engine() {
    let config = EngineConfig::from_toml_str(
        r#"
        [rating]
        tau = 0.3

        [attribution]
        blend = "max"
        max_sources = 4

        [ranking]
        rating_floor = 1200.0
        rating_ceiling = 1800.0
        "#,
    )
    .unwrap();
    let engine = RatingEngine::new(config).unwrap();
    let contents = sample_contents();

    let reports = engine.rank(&contents, &BTreeMap::new()).unwrap();

    let best = reports
        .iter()
        .map(|r| r.overall_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = reports.iter().map(|r| r.shapley_value).sum();
    assert!((total - best).abs() < 1e-9);
    assert_eq!(engine.config().rating.tau, 0.3);
}

#[test]
fn test_non_convergence_surfaces_warning() {
    let mut config = EngineConfig::default();
    config.rating.max_iterations = 1;
    config.rating.convergence_epsilon = 1e-12;
    let engine = RatingEngine::new(config).unwrap();

    let a = RatingState::new(1500.0, 350.0, 0.06);
    let b = RatingState::new(1900.0, 60.0, 0.06);
    let pair = engine.update(&a, &b, MatchResult::WinA).unwrap();

    assert!(!pair.converged());
    assert!(pair.warnings.iter().all(|w| matches!(
        w,
        UpdateWarning::VolatilityNotConverged { .. }
    )));
    // Prior volatility is retained on every side that did not converge
    assert_eq!(pair.rating_a.sigma, 0.06);
    assert!(pair.rating_a.mu > a.mu);
}

#[test]
fn test_reference_rating_period() {
    let player = RatingState::new(1500.0, 200.0, 0.06);
    let results = [
        PeriodResult::new(RatingState::new(1400.0, 30.0, 0.06), 1.0),
        PeriodResult::new(RatingState::new(1550.0, 100.0, 0.06), 0.0),
        PeriodResult::new(RatingState::new(1700.0, 300.0, 0.06), 0.0),
    ];

    let update = update_period(&player, &results, &Default::default()).unwrap();

    assert!((update.rating.mu - 1464.06).abs() < 0.5);
    assert!((update.rating.phi - 151.52).abs() < 0.5);
    assert!((update.rating.sigma - 0.05999).abs() < 0.0005);
}

#[test]
fn test_custom_calculator_receives_votes() {
    let calculator = RecordingCalculator::new();
    let calls = calculator.calls();
    let engine = test_engine().with_calculator(Box::new(calculator));

    let contents = sample_contents();
    let mut records = fresh_records(&engine, &contents);
    apply(&engine, &mut records, &vote("wikipedia", "blog", MatchResult::WinA));
    apply(&engine, &mut records, &vote("blog", "britannica", MatchResult::Tie));

    let recorded = calls.lock().unwrap().clone();
    assert_eq!(recorded, vec![MatchResult::WinA, MatchResult::Tie]);
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(test_engine());
    let pairs: Vec<(RatingState, RatingState)> = (0..8)
        .map(|i| {
            (
                RatingState::new(1400.0 + 25.0 * i as f64, 200.0, 0.06),
                RatingState::new(1500.0, 80.0 + 10.0 * i as f64, 0.06),
            )
        })
        .collect();

    let sequential: Vec<_> = pairs
        .iter()
        .map(|(a, b)| engine.update(a, b, MatchResult::WinB).unwrap())
        .collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = pairs
            .iter()
            .map(|(a, b)| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || engine.update(a, b, MatchResult::WinB).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[test]
fn test_invalid_input_is_rejected_without_panicking() {
    let engine = test_engine();
    let bad = RatingState::new(f64::NAN, 350.0, 0.06);

    assert!(matches!(
        engine.update(&bad, &RatingState::default(), MatchResult::Tie),
        Err(EngineError::InvalidInput { .. })
    ));
    assert!(matches!(
        engine.predict_outcome(&RatingState::default(), &RatingState::new(1500.0, -3.0, 0.06)),
        Err(EngineError::InvalidInput { .. })
    ));
    assert!(matches!(
        engine.rating_interval(&RatingState::new(1500.0, 350.0, 0.0)),
        Err(EngineError::InvalidInput { .. })
    ));
}
