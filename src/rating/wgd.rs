//! Recency-weighted gradient descent estimator
//!
//! Repeatedly nudges a single rating toward agreement with the observed
//! outcomes. Every record contributes an Elo-style error term
//! `(actual - expected) * 400`, weighted by `decay_factor^(N - i)` so that
//! later records dominate. The weights are not normalized.
//!
//! The confidence interval is an informal approximation: a weighted variance
//! of the final round's error terms, divided by `sqrt(N)`, scaled by 1.96.

use crate::error::{EstimationError, Result};
use crate::rating::estimator::RatingEstimator;
use crate::rating::expected::expected_outcome;
use crate::rating::interval::ninety_five;
use crate::types::{validate_records, Estimate, IterationProgress, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Points per unit of outcome error, matching the Elo 400-point scale
const ERROR_SCALE: f64 = 400.0;

/// Configuration for the weighted gradient descent estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WgdConfig {
    /// Rating the descent starts from
    pub initial_score: f64,
    /// Step size applied to the averaged weighted error
    pub learning_rate: f64,
    /// Number of update rounds
    pub max_iter: usize,
    /// Per-position recency decay, expected in `(0, 1]`
    pub decay_factor: f64,
}

impl Default for WgdConfig {
    fn default() -> Self {
        Self {
            initial_score: 1580.0,
            learning_rate: 0.1,
            max_iter: 10_000,
            decay_factor: 0.9,
        }
    }
}

impl WgdConfig {
    /// Few rounds with gentle decay, for quick checks on small datasets
    pub fn quick() -> Self {
        Self {
            max_iter: 1_000,
            decay_factor: 0.99,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.initial_score.is_finite() {
            return Err(EstimationError::invalid(
                "initial_score",
                format!("must be finite, got {}", self.initial_score),
            ));
        }

        if !self.learning_rate.is_finite() {
            return Err(EstimationError::invalid(
                "learning_rate",
                format!("must be finite, got {}", self.learning_rate),
            ));
        }

        if self.max_iter == 0 {
            return Err(EstimationError::invalid(
                "max_iter",
                "at least one iteration is required",
            ));
        }

        // A zero weight sum would turn the weighted variance into NaN.
        if !(self.decay_factor.is_finite() && self.decay_factor > 0.0) {
            return Err(EstimationError::invalid(
                "decay_factor",
                format!("must be positive, got {}", self.decay_factor),
            ));
        }

        Ok(())
    }
}

/// Weighted gradient descent rating estimator
#[derive(Debug, Clone)]
pub struct WgdEstimator {
    config: WgdConfig,
}

impl WgdEstimator {
    /// Create a new estimator, rejecting invalid configuration
    pub fn new(config: WgdConfig) -> Result<Self> {
        config.validate()?;
        if config.decay_factor > 1.0 {
            warn!(
                "decay_factor {} > 1 weights older records more heavily than recent ones",
                config.decay_factor
            );
        }

        Ok(Self { config })
    }

    /// Run the descent, reporting the rating after every round.
    pub fn estimate_with_progress<F>(&self, records: &[Record], mut progress: F) -> Result<Estimate>
    where
        F: FnMut(&IterationProgress),
    {
        validate_records(records)?;

        let n = records.len() as f64;
        let weights = recency_weights(records.len(), self.config.decay_factor);
        let weight_sum: f64 = weights.iter().sum();
        if !weight_sum.is_finite() {
            return Err(EstimationError::invalid(
                "decay_factor",
                format!(
                    "recency weights overflow for {} records at decay {}",
                    records.len(),
                    self.config.decay_factor
                ),
            ));
        }

        let max_iterations = self.config.max_iter;
        let mut rating = self.config.initial_score;

        for iteration in 1..max_iterations {
            let total_diff: f64 = records
                .iter()
                .zip(&weights)
                .map(|(record, weight)| weight * error_term(record, rating))
                .sum();

            rating += self.config.learning_rate * total_diff / n;
            progress(&IterationProgress {
                iteration,
                max_iterations,
                rating,
            });
        }

        // Final round: same update, plus the spread of its error terms.
        let mut total_diff = 0.0;
        let mut weighted_squared_error = 0.0;
        for (record, weight) in records.iter().zip(&weights) {
            let diff = error_term(record, rating);
            total_diff += weight * diff;
            weighted_squared_error += diff * diff * weight;
        }

        rating += self.config.learning_rate * total_diff / n;
        progress(&IterationProgress {
            iteration: max_iterations,
            max_iterations,
            rating,
        });

        let weighted_variance = weighted_squared_error / weight_sum;
        let standard_error = weighted_variance.sqrt() / n.sqrt();

        debug!(
            "WGD finished after {} iterations: rating {:.2}, standard error {:.4}",
            max_iterations, rating, standard_error
        );

        if !rating.is_finite() {
            return Err(EstimationError::invalid(
                "learning_rate",
                format!("descent diverged to {}", rating),
            ));
        }

        Ok(Estimate {
            rating,
            interval: ninety_five(rating, standard_error),
        })
    }
}

impl RatingEstimator for WgdEstimator {
    fn estimate(&self, records: &[Record]) -> Result<Estimate> {
        self.estimate_with_progress(records, |_| {})
    }

    fn name(&self) -> &'static str {
        "wgd"
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}

/// `decay_factor^(len - i)` for every position `i`.
fn recency_weights(len: usize, decay_factor: f64) -> Vec<f64> {
    (0..len)
        .map(|i| decay_factor.powf((len - i) as f64))
        .collect()
}

/// `(actual - expected) * 400` for one record at the current rating.
fn error_term(record: &Record, rating: f64) -> f64 {
    (record.score() - expected_outcome(rating, record.difficulty)) * ERROR_SCALE
}
