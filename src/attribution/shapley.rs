//! Exact Shapley value attribution
//!
//! Every coalition of the `n` sources is enumerated once, so cost grows as
//! `n · 2^n`. Callers bound `n` with `max_sources`; the crate-wide ceiling
//! is [`MAX_ENUMERABLE_SOURCES`].

use crate::attribution::coalition::{blended_value, Coalition};
use crate::config::{AttributionConfig, MAX_ENUMERABLE_SOURCES};
use crate::error::{EngineError, EngineResult};
use crate::types::SourceId;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Shapley value of every source under the coalition value function `value`
///
/// `value` is never called for the empty coalition, which is worth 0.
/// An empty source list yields an empty map.
pub fn calculate_shapley_values<F>(
    value: F,
    sources: &[SourceId],
    max_sources: usize,
) -> EngineResult<BTreeMap<SourceId, f64>>
where
    F: Fn(&Coalition<'_>) -> f64,
{
    let n = sources.len();
    if n == 0 {
        return Ok(BTreeMap::new());
    }

    let limit = max_sources.min(MAX_ENUMERABLE_SOURCES);
    if n > limit {
        return Err(EngineError::CoalitionTooLarge {
            sources: n,
            max: limit,
        });
    }

    let mut seen = BTreeSet::new();
    for source in sources {
        if !seen.insert(source.as_str()) {
            return Err(EngineError::invalid(
                "sources",
                format!("duplicate source id {}", source),
            ));
        }
    }

    let coalitions = 1usize << n;
    let mut values = vec![0.0; coalitions];
    for mask in 1..coalitions {
        let coalition = Coalition::new(sources, mask as u32);
        let v = value(&coalition);
        if !v.is_finite() {
            return Err(EngineError::invalid(
                "coalition_value",
                format!("non-finite value {} for a coalition of {}", v, coalition.len()),
            ));
        }
        values[mask] = v;
    }

    // |S|! (n - |S| - 1)! / n! for every coalition size |S| < n
    let factorials: Vec<f64> = (0..=n)
        .scan(1.0, |acc, k| {
            if k > 0 {
                *acc *= k as f64;
            }
            Some(*acc)
        })
        .collect();
    let weights: Vec<f64> = (0..n)
        .map(|size| factorials[size] * factorials[n - size - 1] / factorials[n])
        .collect();

    let mut attribution = BTreeMap::new();
    for (i, source) in sources.iter().enumerate() {
        let bit = 1usize << i;
        let phi: f64 = (0..coalitions)
            .filter(|mask| mask & bit == 0)
            .map(|mask| {
                let size = mask.count_ones() as usize;
                weights[size] * (values[mask | bit] - values[mask])
            })
            .sum();
        attribution.insert(source.clone(), phi);
    }

    debug!(
        sources = n,
        coalitions = coalitions - 1,
        grand_value = values[coalitions - 1],
        "Computed Shapley attribution"
    );

    Ok(attribution)
}

/// Attribute blended quality across sources using the configured blend
pub fn attribute_quality(
    overall_scores: &BTreeMap<SourceId, f64>,
    config: &AttributionConfig,
) -> EngineResult<BTreeMap<SourceId, f64>> {
    let sources: Vec<SourceId> = overall_scores.keys().cloned().collect();
    calculate_shapley_values(
        blended_value(overall_scores, config.blend),
        &sources,
        config.max_sources,
    )
}
