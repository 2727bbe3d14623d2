//! Glicko-2 rating updates
//!
//! Ratings are stored on the display scale (centre 1500) and converted to
//! the Glicko-2 scale for computation. The pairwise [`update`] runs one
//! rating period per side with exactly one opponent; [`update_period`] is
//! the general multi-opponent form it builds on.

use crate::config::RatingConfig;
use crate::error::{EngineError, EngineResult};
use crate::rating::calculator::RatingCalculator;
use crate::rating::predictor;
use crate::types::{MatchResult, RatingInterval, RatingPair, RatingState, Side, UpdateWarning};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Ratio between the display scale and the Glicko-2 scale
pub const GLICKO2_SCALE: f64 = 173.7178;

/// Display rating that maps to mu = 0 on the Glicko-2 scale
pub const DISPLAY_CENTER: f64 = 1500.0;

pub(crate) fn to_glicko2_mu(rating: f64) -> f64 {
    (rating - DISPLAY_CENTER) / GLICKO2_SCALE
}

pub(crate) fn to_glicko2_phi(deviation: f64) -> f64 {
    deviation / GLICKO2_SCALE
}

fn to_display_mu(mu: f64) -> f64 {
    mu * GLICKO2_SCALE + DISPLAY_CENTER
}

fn to_display_phi(phi: f64) -> f64 {
    phi * GLICKO2_SCALE
}

/// Dampens an opponent's influence in proportion to their uncertainty
pub(crate) fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// Expected score against an opponent, Glicko-2 scale
pub(crate) fn expectation(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// One game inside a rating period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    /// Opponent's rating before the period
    pub opponent: RatingState,
    /// 1.0 win, 0.5 tie, 0.0 loss
    pub score: f64,
}

impl PeriodResult {
    pub fn new(opponent: RatingState, score: f64) -> Self {
        Self { opponent, score }
    }
}

/// Estimated outcome variance `v` and improvement `Δ`, Glicko-2 scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStatistics {
    pub variance: f64,
    pub improvement: f64,
}

impl PeriodStatistics {
    /// `Σ g(φj)(s - E)`, the signal that moves mu
    pub fn performance(&self) -> f64 {
        self.improvement / self.variance
    }
}

/// Compute `v` and `Δ` for a player over a set of results
///
/// Returns `None` when the period carries no information (no results, or
/// opponents so mismatched that every expectation saturates).
pub fn period_statistics(state: &RatingState, results: &[PeriodResult]) -> Option<PeriodStatistics> {
    let (information, performance) = period_sums(state, results);

    if !(information > 0.0 && information.is_finite()) {
        return None;
    }

    let variance = 1.0 / information;
    Some(PeriodStatistics {
        variance,
        improvement: variance * performance,
    })
}

/// `Σ g²E(1 - E)` and `Σ g(s - E)` over the period
fn period_sums(state: &RatingState, results: &[PeriodResult]) -> (f64, f64) {
    let mu = to_glicko2_mu(state.mu);

    let mut information = 0.0;
    let mut performance = 0.0;
    for result in results {
        let mu_j = to_glicko2_mu(result.opponent.mu);
        let phi_j = to_glicko2_phi(result.opponent.phi);
        let g_j = g(phi_j);
        let e = expectation(mu, mu_j, phi_j);
        information += g_j * g_j * e * (1.0 - e);
        performance += g_j * (result.score - e);
    }

    (information, performance)
}

/// Converged volatility and the iterations spent finding it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilitySolution {
    pub sigma: f64,
    pub iterations: u32,
}

/// Solve for the new volatility with the Illinois variant of regula falsi
///
/// `phi` is on the Glicko-2 scale. Bracket search and refinement share the
/// `max_iterations` budget; exhausting it yields
/// [`EngineError::ConvergenceFailure`].
pub fn solve_volatility(
    phi: f64,
    sigma: f64,
    stats: &PeriodStatistics,
    config: &RatingConfig,
) -> EngineResult<VolatilitySolution> {
    let tau = config.tau;
    let epsilon = config.convergence_epsilon;
    let max_iterations = config.max_iterations;

    let phi_sq = phi * phi;
    let v = stats.variance;
    let delta_sq = stats.improvement * stats.improvement;
    let a = (sigma * sigma).ln();

    let f = |x: f64| {
        let ex = x.exp();
        let denom = phi_sq + v + ex;
        ex * (delta_sq - phi_sq - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
    };

    let mut iterations = 0u32;

    let mut lower = a;
    let mut upper = if delta_sq > phi_sq + v {
        (delta_sq - phi_sq - v).ln()
    } else {
        let mut k = 1.0;
        loop {
            if iterations >= max_iterations {
                return Err(EngineError::ConvergenceFailure { iterations });
            }
            iterations += 1;
            let candidate = a - k * tau;
            if f(candidate) >= 0.0 {
                break candidate;
            }
            k += 1.0;
        }
    };

    let mut f_lower = f(lower);
    let mut f_upper = f(upper);

    while (upper - lower).abs() > epsilon {
        if iterations >= max_iterations {
            return Err(EngineError::ConvergenceFailure { iterations });
        }
        iterations += 1;

        let candidate = lower + (lower - upper) * f_lower / (f_upper - f_lower);
        if !candidate.is_finite() {
            return Err(EngineError::ConvergenceFailure { iterations });
        }
        let f_candidate = f(candidate);

        if f_candidate * f_upper <= 0.0 {
            lower = upper;
            f_lower = f_upper;
        } else {
            f_lower /= 2.0;
        }
        upper = candidate;
        f_upper = f_candidate;
    }

    let new_sigma = (lower / 2.0).exp();
    if !(new_sigma > 0.0 && new_sigma.is_finite()) {
        return Err(EngineError::ConvergenceFailure { iterations });
    }

    Ok(VolatilitySolution {
        sigma: new_sigma,
        iterations,
    })
}

/// Outcome of one rating period for a single player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodUpdate {
    pub rating: RatingState,
    /// Iterations spent in the volatility solver
    pub iterations: u32,
    /// False when the solver gave up and the prior sigma was kept
    pub converged: bool,
}

/// Run one Glicko-2 rating period for `state` against `results`
pub fn update_period(
    state: &RatingState,
    results: &[PeriodResult],
    config: &RatingConfig,
) -> EngineResult<PeriodUpdate> {
    state.validate("rating")?;
    for (i, result) in results.iter().enumerate() {
        result.opponent.validate(&format!("results[{}].opponent", i))?;
        if !(0.0..=1.0).contains(&result.score) {
            return Err(EngineError::invalid(
                format!("results[{}].score", i),
                format!("must be within [0, 1], got {}", result.score),
            ));
        }
    }

    let mu = to_glicko2_mu(state.mu);
    let phi = to_glicko2_phi(state.phi);

    let stats = match period_statistics(state, results) {
        Some(stats) => stats,
        None => {
            // v is infinite: phi' = phi* and mu moves by phi*² Σ g(s - E)
            let (_, performance) = period_sums(state, results);
            let phi_star_sq = phi * phi + state.sigma * state.sigma;
            debug!(
                games = results.len(),
                performance,
                "Rating period carries no variance information, skipping volatility solve"
            );
            return Ok(PeriodUpdate {
                rating: RatingState {
                    mu: state.mu + to_display_phi(phi_star_sq * performance),
                    phi: inflated_deviation(state, state.sigma),
                    sigma: state.sigma,
                },
                iterations: 0,
                converged: true,
            });
        }
    };

    let (sigma, iterations, converged) = match solve_volatility(phi, state.sigma, &stats, config) {
        Ok(solution) => (solution.sigma, solution.iterations, true),
        Err(EngineError::ConvergenceFailure { iterations }) => {
            warn!(
                iterations,
                sigma = state.sigma,
                "Volatility solver did not converge, keeping prior volatility"
            );
            (state.sigma, iterations, false)
        }
        Err(e) => return Err(e),
    };

    let phi_star = (phi * phi + sigma * sigma).sqrt();
    let new_phi = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / stats.variance).sqrt();
    let new_mu = mu + new_phi * new_phi * stats.performance();

    let rating = RatingState {
        mu: to_display_mu(new_mu),
        phi: to_display_phi(new_phi),
        sigma,
    };

    debug!(
        mu = rating.mu,
        phi = rating.phi,
        sigma = rating.sigma,
        iterations,
        "Rating period applied"
    );

    Ok(PeriodUpdate {
        rating,
        iterations,
        converged,
    })
}

/// Update both participants of a single vote
///
/// Each side plays one game against the other's pre-match rating.
pub fn update(
    rating_a: &RatingState,
    rating_b: &RatingState,
    result: MatchResult,
    config: &RatingConfig,
) -> EngineResult<RatingPair> {
    rating_a.validate("rating_a")?;
    rating_b.validate("rating_b")?;

    let side_a = update_period(
        rating_a,
        &[PeriodResult::new(*rating_b, result.score_a())],
        config,
    )?;
    let side_b = update_period(
        rating_b,
        &[PeriodResult::new(*rating_a, result.score_b())],
        config,
    )?;

    let mut warnings = Vec::new();
    for (side, outcome) in [(Side::A, &side_a), (Side::B, &side_b)] {
        if !outcome.converged {
            warnings.push(UpdateWarning::VolatilityNotConverged {
                side,
                iterations: outcome.iterations,
            });
        }
    }

    Ok(RatingPair {
        rating_a: side_a.rating,
        rating_b: side_b.rating,
        warnings,
    })
}

/// Pre-period deviation `φ* = sqrt(φ² + σ²)` on the display scale
pub fn inflated_deviation(state: &RatingState, sigma: f64) -> f64 {
    let phi = to_glicko2_phi(state.phi);
    to_display_phi((phi * phi + sigma * sigma).sqrt())
}

/// Inflate deviation for `periods` rating periods without games
///
/// The deviation never grows past the configured initial deviation.
pub fn decay(state: &RatingState, periods: f64, config: &RatingConfig) -> EngineResult<RatingState> {
    state.validate("rating")?;
    if !(periods >= 0.0 && periods.is_finite()) {
        return Err(EngineError::invalid(
            "periods",
            format!("must be non-negative and finite, got {}", periods),
        ));
    }

    let phi = to_glicko2_phi(state.phi);
    let inflated = to_display_phi((phi * phi + periods * state.sigma * state.sigma).sqrt());

    Ok(RatingState {
        phi: inflated.min(config.initial_deviation.max(state.phi)),
        ..*state
    })
}

/// Glicko-2 rating calculator implementation
#[derive(Debug, Clone)]
pub struct Glicko2Calculator {
    config: RatingConfig,
}

impl Glicko2Calculator {
    /// Create a new Glicko-2 calculator
    pub fn new(config: RatingConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }
}

impl RatingCalculator for Glicko2Calculator {
    fn update(
        &self,
        rating_a: &RatingState,
        rating_b: &RatingState,
        result: MatchResult,
    ) -> EngineResult<RatingPair> {
        update(rating_a, rating_b, result, &self.config)
    }

    fn predict_outcome(&self, rating_a: &RatingState, rating_b: &RatingState) -> EngineResult<f64> {
        rating_a.validate("rating_a")?;
        rating_b.validate("rating_b")?;
        Ok(predictor::predict_outcome(rating_a, rating_b))
    }

    fn rating_interval(&self, rating: &RatingState) -> EngineResult<RatingInterval> {
        rating.validate("rating")?;
        Ok(predictor::rating_interval(
            rating,
            self.config.interval_multiplier,
        ))
    }

    fn initial_rating(&self) -> RatingState {
        self.config.initial_state()
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> EngineResult<()> {
        let new_config: RatingConfig = serde_json::from_value(config).map_err(|e| {
            EngineError::config(format!("Invalid Glicko-2 configuration: {}", e))
        })?;

        new_config.validate()?;
        self.config = new_config;
        Ok(())
    }
}
