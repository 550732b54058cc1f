//! Rating estimation engine
//!
//! Two interchangeable estimators behind the [`RatingEstimator`] trait:
//! recency-weighted gradient descent on the Elo logistic curve, and a
//! single-period Glicko-2 update with its Illinois volatility solver.

pub mod estimator;
pub mod expected;
pub mod glicko2;
pub mod interval;
pub mod volatility;
pub mod wgd;

// Re-export commonly used types
pub use estimator::{EstimatorKind, RatingEstimator};
pub use expected::expected_outcome;
pub use glicko2::{Game, Glicko2Config, Glicko2Estimator};
pub use interval::{confidence_interval, ninety_five, Z_95};
pub use volatility::{VolatilityInputs, VolatilitySolution, VolatilitySolver};
pub use wgd::{WgdConfig, WgdEstimator};
