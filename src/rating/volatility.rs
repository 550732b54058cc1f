//! Glicko-2 volatility update
//!
//! Finds the new volatility as the root of Glickman's `f(x)` (step 5 of the
//! Glicko-2 paper) using the Illinois variant of regula falsi. Both the
//! bracket search and the root iteration are capped; running out of either
//! budget is reported as [`EstimationError::VolatilityConvergence`].

use crate::error::{EstimationError, Result, SolverStage};
use tracing::debug;

/// Default `|B - A|` below which the root is accepted
pub const CONVERGENCE_TOLERANCE: f64 = 0.000_001;

/// Default cap on `k` when stepping the lower bracket down
pub const MAX_BRACKET_STEPS: usize = 100;

/// Default cap on Illinois iterations
pub const MAX_ITERATIONS: usize = 100;

/// Quantities from one rating period that drive the volatility update, all on
/// the internal Glicko-2 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityInputs {
    /// Current deviation `phi`
    pub deviation: f64,
    /// Estimated variance `v`
    pub variance: f64,
    /// Estimated improvement `delta`
    pub delta: f64,
    /// Current volatility `sigma`
    pub volatility: f64,
}

/// Result of a successful solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilitySolution {
    /// New volatility `sigma' = exp(root / 2)`
    pub volatility: f64,
    /// Root of `f` in log-variance space
    pub root: f64,
    /// Illinois iterations spent
    pub iterations: usize,
}

/// Illinois root finder for the volatility equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilitySolver {
    tau: f64,
    tolerance: f64,
    max_bracket_steps: usize,
    max_iterations: usize,
}

impl VolatilitySolver {
    pub fn new(tau: f64) -> Result<Self> {
        Self::with_limits(tau, CONVERGENCE_TOLERANCE, MAX_BRACKET_STEPS, MAX_ITERATIONS)
    }

    pub fn with_limits(
        tau: f64,
        tolerance: f64,
        max_bracket_steps: usize,
        max_iterations: usize,
    ) -> Result<Self> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(EstimationError::invalid(
                "tau",
                format!("must be positive, got {}", tau),
            ));
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(EstimationError::invalid(
                "convergence_tolerance",
                format!("must be positive, got {}", tolerance),
            ));
        }

        Ok(Self {
            tau,
            tolerance,
            max_bracket_steps,
            max_iterations,
        })
    }

    /// Glickman's `f(x)` for the given period.
    pub fn objective(&self, inputs: &VolatilityInputs, x: f64) -> f64 {
        let a = inputs.volatility.powi(2).ln();
        let phi_sq = inputs.deviation.powi(2);
        let ex = x.exp();

        let numerator = ex * (inputs.delta.powi(2) - phi_sq - inputs.variance - ex);
        let denominator = 2.0 * (phi_sq + inputs.variance + ex).powi(2);

        numerator / denominator - (x - a) / self.tau.powi(2)
    }

    /// Solve for the new volatility.
    pub fn solve(&self, inputs: &VolatilityInputs) -> Result<VolatilitySolution> {
        if !(inputs.volatility.is_finite() && inputs.volatility > 0.0) {
            return Err(EstimationError::invalid(
                "volatility",
                format!("must be positive, got {}", inputs.volatility),
            ));
        }

        let f = |x: f64| self.objective(inputs, x);
        let a = inputs.volatility.powi(2).ln();

        let mut big_a = a;
        let excess = inputs.delta.powi(2) - inputs.deviation.powi(2) - inputs.variance;
        let mut big_b = if excess > 0.0 {
            excess.ln()
        } else {
            self.lower_bracket(a, &f)?
        };

        let mut f_a = f(big_a);
        let mut f_b = f(big_b);
        let mut iterations = 0;

        while (big_b - big_a).abs() > self.tolerance {
            if iterations >= self.max_iterations {
                return Err(EstimationError::VolatilityConvergence {
                    stage: SolverStage::Illinois,
                    iterations,
                });
            }
            iterations += 1;

            let big_c = big_a + (big_a - big_b) * f_a / (f_b - f_a);
            if !big_c.is_finite() {
                return Err(EstimationError::VolatilityConvergence {
                    stage: SolverStage::Illinois,
                    iterations,
                });
            }

            let f_c = f(big_c);
            if f_c * f_b < 0.0 {
                big_a = big_b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }

            big_b = big_c;
            f_b = f_c;
        }

        let volatility = (big_a / 2.0).exp();
        debug!(
            "Volatility converged in {} iterations: {:.6} -> {:.6}",
            iterations, inputs.volatility, volatility
        );

        Ok(VolatilitySolution {
            volatility,
            root: big_a,
            iterations,
        })
    }

    /// Step `a - k * tau` down while `f` stays negative.
    ///
    /// `f(a)` is negative on this branch, so the first non-negative point
    /// closes the bracket.
    fn lower_bracket(&self, a: f64, f: impl Fn(f64) -> f64) -> Result<f64> {
        (1..=self.max_bracket_steps)
            .map(|k| a - k as f64 * self.tau)
            .find(|&x| f(x) >= 0.0)
            .ok_or(EstimationError::VolatilityConvergence {
                stage: SolverStage::Bracketing,
                iterations: self.max_bracket_steps,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from Glickman's paper, "Example calculation".
    fn glickman_example() -> VolatilityInputs {
        VolatilityInputs {
            deviation: 1.1513,
            variance: 1.7785,
            delta: -0.4834,
            volatility: 0.06,
        }
    }

    #[test]
    fn test_glickman_example() {
        let solver = VolatilitySolver::new(0.5).unwrap();
        let solution = solver.solve(&glickman_example()).unwrap();

        assert!((solution.volatility - 0.05999).abs() < 1e-4);
        assert!(solution.iterations < MAX_ITERATIONS);
        assert!(solver.objective(&glickman_example(), solution.root).abs() < 1e-4);
    }

    #[test]
    fn test_large_delta_uses_direct_bracket() {
        // delta^2 exceeds phi^2 + v, so B = ln(delta^2 - phi^2 - v).
        let inputs = VolatilityInputs {
            deviation: 0.2,
            variance: 0.5,
            delta: 3.0,
            volatility: 0.06,
        };
        let solver = VolatilitySolver::new(0.5).unwrap();
        let solution = solver.solve(&inputs).unwrap();

        assert!(solution.volatility > 0.06);
        assert!(solver.objective(&inputs, solution.root).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_tau() {
        assert!(VolatilitySolver::new(0.0).is_err());
        assert!(VolatilitySolver::new(-0.5).is_err());
        assert!(VolatilitySolver::new(f64::NAN).is_err());
        assert!(VolatilitySolver::with_limits(0.5, 0.0, 100, 100).is_err());
    }

    #[test]
    fn test_non_positive_volatility() {
        let solver = VolatilitySolver::new(0.5).unwrap();
        let inputs = VolatilityInputs {
            volatility: 0.0,
            ..glickman_example()
        };
        assert!(matches!(
            solver.solve(&inputs),
            Err(EstimationError::InvalidParameter {
                name: "volatility",
                ..
            })
        ));
    }

    #[test]
    fn test_bracket_cap() {
        // Without any bracket steps the fallback search cannot succeed.
        let solver = VolatilitySolver::with_limits(0.5, CONVERGENCE_TOLERANCE, 0, 100).unwrap();
        assert_eq!(
            solver.solve(&glickman_example()),
            Err(EstimationError::VolatilityConvergence {
                stage: SolverStage::Bracketing,
                iterations: 0,
            })
        );
    }

    #[test]
    fn test_iteration_cap() {
        let solver = VolatilitySolver::with_limits(0.5, CONVERGENCE_TOLERANCE, 100, 1).unwrap();
        assert!(matches!(
            solver.solve(&glickman_example()),
            Err(EstimationError::VolatilityConvergence {
                stage: SolverStage::Illinois,
                ..
            })
        ));
    }

    #[test]
    fn test_no_improvement_lowers_volatility() {
        // With delta = 0 the first term of f is negative at a, so the root
        // lies below the current log-variance.
        let inputs = VolatilityInputs {
            deviation: 1.0,
            variance: 1.0,
            delta: 0.0,
            volatility: 0.06,
        };
        let solver = VolatilitySolver::new(0.5).unwrap();
        let a = 0.06_f64.powi(2).ln();
        assert!(solver.objective(&inputs, a) < 0.0);

        let solution = solver.solve(&inputs).unwrap();
        assert!(solution.root < a);
        assert!(solution.volatility < 0.06);
    }
}
