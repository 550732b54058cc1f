//! Common types used throughout the estimation engine

use serde::{Deserialize, Serialize};

use crate::error::{EstimationError, Result};

/// A single observed outcome against an item of known difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Difficulty on the same scale as the agent's rating
    pub difficulty: f64,
    /// `true` if the agent passed the item
    pub outcome: bool,
}

impl Record {
    pub fn new(difficulty: f64, outcome: bool) -> Self {
        Self {
            difficulty,
            outcome,
        }
    }

    pub fn pass(difficulty: f64) -> Self {
        Self::new(difficulty, true)
    }

    pub fn fail(difficulty: f64) -> Self {
        Self::new(difficulty, false)
    }

    /// Outcome as a score, `1.0` for a pass and `0.0` for a failure
    pub fn score(&self) -> f64 {
        if self.outcome {
            1.0
        } else {
            0.0
        }
    }
}

/// Check that a record sequence can be fed to an estimator.
pub(crate) fn validate_records(records: &[Record]) -> Result<()> {
    if records.is_empty() {
        return Err(EstimationError::EmptyDataset);
    }

    if let Some((index, record)) = records
        .iter()
        .enumerate()
        .find(|(_, record)| !record.difficulty.is_finite())
    {
        return Err(EstimationError::MalformedRecord {
            index,
            reason: format!("difficulty is not finite: {}", record.difficulty),
        });
    }

    Ok(())
}

/// Lower and upper bound around a point estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl From<ConfidenceInterval> for (f64, f64) {
    fn from(interval: ConfidenceInterval) -> (f64, f64) {
        (interval.low, interval.high)
    }
}

/// Point estimate with its 95% confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub rating: f64,
    pub interval: ConfidenceInterval,
}

/// Rating, deviation and volatility of a Glicko-2 player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2State {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Glicko2State {
    /// Check the strictly positive deviation and volatility invariant
    pub fn validate(&self) -> Result<()> {
        if !self.rating.is_finite() {
            return Err(EstimationError::invalid(
                "rating",
                format!("must be finite, got {}", self.rating),
            ));
        }
        if !(self.deviation.is_finite() && self.deviation > 0.0) {
            return Err(EstimationError::invalid(
                "deviation",
                format!("must be positive, got {}", self.deviation),
            ));
        }
        if !(self.volatility.is_finite() && self.volatility > 0.0) {
            return Err(EstimationError::invalid(
                "volatility",
                format!("must be positive, got {}", self.volatility),
            ));
        }
        Ok(())
    }
}

/// Progress of one weighted gradient descent round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationProgress {
    /// 1-based round number
    pub iteration: usize,
    pub max_iterations: usize,
    /// Rating after this round's update
    pub rating: f64,
}
