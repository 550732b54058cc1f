//! Paired-comparison win probability
//!
//! The logistic curve used by the weighted gradient descent estimator:
//! `1 / (1 + 10^((difficulty - rating) / 400))`. Evaluation is delegated to
//! the Elo expected-score function of the skillratings crate, which uses the
//! same 400-point logistic scale.

use skillratings::elo::{expected_score, EloRating};

/// Probability that an agent rated `rating` passes an item of `difficulty`.
///
/// Strictly increasing in `rating`, strictly decreasing in `difficulty`, and
/// exactly `0.5` when the two are equal.
pub fn expected_outcome(rating: f64, difficulty: f64) -> f64 {
    let (expected, _) = expected_score(
        &EloRating { rating },
        &EloRating { rating: difficulty },
    );
    expected
}
