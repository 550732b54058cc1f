//! Skill Estimate - rating estimation from pass/fail outcomes
//!
//! This crate estimates an agent's latent skill rating, with a 95%
//! confidence interval, from an ordered sequence of outcomes against items of
//! known difficulty. Two estimators are provided: recency-weighted gradient
//! descent on the Elo logistic curve, and a single-period Glicko-2 update.

pub mod config;
pub mod dataset;
pub mod error;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{EstimationError, Result};
pub use types::*;

// Re-export key components
pub use rating::{EstimatorKind, Glicko2Estimator, RatingEstimator, WgdEstimator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
