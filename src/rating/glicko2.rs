//! Glicko-2 estimator
//!
//! Treats every record as a game within a single rating period against an
//! opponent rated at the record's difficulty, with a small fixed deviation
//! standing in for the low uncertainty about item difficulty. One Glicko-2
//! update over that period yields the posterior rating, deviation and
//! volatility.
//!
//! The reported interval is `rating ± 1.96 * deviation`, using the posterior
//! deviation directly rather than a standard error. This is a known
//! approximation and is kept as is.

use crate::error::{EstimationError, Result};
use crate::rating::estimator::RatingEstimator;
use crate::rating::interval::ninety_five;
use crate::rating::volatility::{
    VolatilityInputs, VolatilitySolver, CONVERGENCE_TOLERANCE, MAX_BRACKET_STEPS, MAX_ITERATIONS,
};
use crate::types::{validate_records, Estimate, Glicko2State, Record};
use serde::{Deserialize, Serialize};
use std::f64::consts::{LN_10, PI};
use tracing::debug;

/// Factor between the public rating scale and the internal Glicko-2 scale
pub const GLICKO2_SCALE: f64 = 173.7178;

/// Rating mapped to zero on the internal scale
pub const RATING_CENTER: f64 = 1500.0;

/// `ln(10) / 400`
pub const GLICKO2_Q: f64 = LN_10 / 400.0;

pub fn scale_rating(rating: f64) -> f64 {
    (rating - RATING_CENTER) / GLICKO2_SCALE
}

pub fn scale_deviation(deviation: f64) -> f64 {
    deviation / GLICKO2_SCALE
}

pub fn scale_back_rating(mu: f64) -> f64 {
    mu * GLICKO2_SCALE + RATING_CENTER
}

pub fn scale_back_deviation(phi: f64) -> f64 {
    phi * GLICKO2_SCALE
}

/// Attenuation of an opponent's impact by their (internal) deviation.
///
/// Note the `Q²` factor: the deviation is already on the internal scale, so
/// opponents with small deviations are treated as almost exactly known.
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * GLICKO2_Q.powi(2) * phi.powi(2) / PI.powi(2)).sqrt()
}

/// Expected score on the internal scale against opponent `(mu_j, phi_j)`
pub fn expected(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// One game of a rating period, on the public rating scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub opponent_rating: f64,
    pub opponent_deviation: f64,
    /// `1.0` win, `0.0` loss
    pub score: f64,
}

/// Configuration for the Glicko-2 estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    pub initial_score: f64,
    pub initial_rd: f64,
    pub initial_volatility: f64,
    /// System constant constraining volatility change
    pub tau: f64,
    /// Deviation assigned to every item difficulty
    pub min_opponent_deviation: f64,
    pub convergence_tolerance: f64,
    pub max_bracket_steps: usize,
    pub max_solver_iterations: usize,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            initial_score: 1580.0,
            initial_rd: 350.0,
            initial_volatility: 0.06,
            tau: 0.5,
            min_opponent_deviation: 30.0,
            convergence_tolerance: CONVERGENCE_TOLERANCE,
            max_bracket_steps: MAX_BRACKET_STEPS,
            max_solver_iterations: MAX_ITERATIONS,
        }
    }
}

impl Glicko2Config {
    pub fn initial_state(&self) -> Glicko2State {
        Glicko2State {
            rating: self.initial_score,
            deviation: self.initial_rd,
            volatility: self.initial_volatility,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.initial_state().validate()?;

        if !(self.min_opponent_deviation.is_finite() && self.min_opponent_deviation >= 0.0) {
            return Err(EstimationError::invalid(
                "min_opponent_deviation",
                format!("must be non-negative, got {}", self.min_opponent_deviation),
            ));
        }

        self.solver().map(|_| ())
    }

    fn solver(&self) -> Result<VolatilitySolver> {
        VolatilitySolver::with_limits(
            self.tau,
            self.convergence_tolerance,
            self.max_bracket_steps,
            self.max_solver_iterations,
        )
    }
}

/// Single-period Glicko-2 rating estimator
#[derive(Debug, Clone)]
pub struct Glicko2Estimator {
    config: Glicko2Config,
    solver: VolatilitySolver,
}

impl Glicko2Estimator {
    /// Create a new estimator, rejecting invalid configuration
    pub fn new(config: Glicko2Config) -> Result<Self> {
        config.validate()?;
        let solver = config.solver()?;

        Ok(Self { config, solver })
    }

    /// Games implied by the records, one per record in order
    pub fn games(&self, records: &[Record]) -> Vec<Game> {
        records
            .iter()
            .map(|record| Game {
                opponent_rating: record.difficulty,
                opponent_deviation: self.config.min_opponent_deviation,
                score: record.score(),
            })
            .collect()
    }

    /// Posterior state after one rating period over all records
    pub fn rate(&self, records: &[Record]) -> Result<Glicko2State> {
        validate_records(records)?;
        self.update(&self.config.initial_state(), &self.games(records))
    }

    /// General Glicko-2 rating period update of `state` over `games`.
    pub fn update(&self, state: &Glicko2State, games: &[Game]) -> Result<Glicko2State> {
        state.validate()?;
        validate_games(games)?;

        let mu = scale_rating(state.rating);
        let phi = scale_deviation(state.deviation);

        let mut information = 0.0;
        let mut improvement = 0.0;
        for game in games {
            let mu_j = scale_rating(game.opponent_rating);
            let phi_j = scale_deviation(game.opponent_deviation);
            let g_phi_j = g(phi_j);
            let e = expected(mu, mu_j, phi_j);

            information += g_phi_j.powi(2) * e * (1.0 - e);
            improvement += g_phi_j * (game.score - e);
        }

        if !(information.is_finite() && information > 0.0) {
            return Err(EstimationError::DegenerateVariance { information });
        }

        let variance = 1.0 / information;
        let delta = variance * improvement;

        let solution = self.solver.solve(&VolatilityInputs {
            deviation: phi,
            variance,
            delta,
            volatility: state.volatility,
        })?;

        let phi_star = (phi.powi(2) + solution.volatility.powi(2)).sqrt();
        let new_phi = 1.0 / (1.0 / phi_star.powi(2) + 1.0 / variance).sqrt();
        // delta already carries the factor v here.
        let new_mu = mu + new_phi.powi(2) * delta;

        let updated = Glicko2State {
            rating: scale_back_rating(new_mu),
            deviation: scale_back_deviation(new_phi),
            volatility: solution.volatility,
        };

        debug!(
            "Glicko-2 period over {} games: rating {:.2} -> {:.2}, deviation {:.2} -> {:.2}",
            games.len(),
            state.rating,
            updated.rating,
            state.deviation,
            updated.deviation
        );

        Ok(updated)
    }
}

/// Check that every game has a finite opponent and a score in `[0, 1]`.
fn validate_games(games: &[Game]) -> Result<()> {
    if games.is_empty() {
        return Err(EstimationError::EmptyDataset);
    }

    for (index, game) in games.iter().enumerate() {
        let reason = if !game.opponent_rating.is_finite() {
            format!("opponent rating is not finite: {}", game.opponent_rating)
        } else if !(game.opponent_deviation.is_finite() && game.opponent_deviation >= 0.0) {
            format!(
                "opponent deviation must be non-negative, got {}",
                game.opponent_deviation
            )
        } else if !(0.0..=1.0).contains(&game.score) {
            format!("score must lie in [0, 1], got {}", game.score)
        } else {
            continue;
        };

        return Err(EstimationError::MalformedRecord { index, reason });
    }

    Ok(())
}

/// Point estimate and interval for a posterior state
pub fn state_estimate(state: &Glicko2State) -> Estimate {
    Estimate {
        rating: state.rating,
        interval: ninety_five(state.rating, state.deviation),
    }
}

impl RatingEstimator for Glicko2Estimator {
    fn estimate(&self, records: &[Record]) -> Result<Estimate> {
        self.rate(records).map(|state| state_estimate(&state))
    }

    fn name(&self) -> &'static str {
        "glicko2"
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
