//! Error types for the estimation engine
//!
//! The core estimators return [`EstimationError`] through the crate
//! [`Result`] alias. Application edges (configuration, file loading, the
//! binary) wrap these in `anyhow` the same way.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EstimationError>;

/// Stage of the volatility solver that ran out of iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStage {
    /// Stepping the lower bracket down by multiples of tau
    Bracketing,
    /// Illinois false-position iteration
    Illinois,
}

impl std::fmt::Display for SolverStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStage::Bracketing => write!(f, "bracket search"),
            SolverStage::Illinois => write!(f, "Illinois iteration"),
        }
    }
}

/// Custom error types for specific estimation scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("Cannot estimate a rating from an empty dataset")]
    EmptyDataset,

    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Volatility solver did not converge during {stage} after {iterations} iterations")]
    VolatilityConvergence {
        stage: SolverStage,
        iterations: usize,
    },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Estimated variance is degenerate (sum of information terms: {information})")]
    DegenerateVariance { information: f64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EstimationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EstimationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
