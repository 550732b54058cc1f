//! Symmetric confidence intervals

use crate::types::ConfidenceInterval;

/// Two-sided 95% normal quantile
pub const Z_95: f64 = 1.96;

/// Interval `estimate ± z * scale`.
///
/// `scale` is whatever spread measure the caller has: a standard error for
/// weighted gradient descent, the posterior deviation for Glicko-2.
pub fn confidence_interval(estimate: f64, scale: f64, z: f64) -> ConfidenceInterval {
    debug_assert!(scale >= 0.0 || scale.is_nan());
    ConfidenceInterval {
        low: estimate - z * scale,
        high: estimate + z * scale,
    }
}

/// 95% interval around `estimate`
pub fn ninety_five(estimate: f64, scale: f64) -> ConfidenceInterval {
    confidence_interval(estimate, scale, Z_95)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ninety_five() {
        let interval = ninety_five(1500.0, 100.0);
        assert!((interval.low - 1304.0).abs() < 1e-9);
        assert!((interval.high - 1696.0).abs() < 1e-9);
        assert!(interval.contains(1500.0));
    }

    #[test]
    fn test_zero_scale_collapses() {
        let interval = confidence_interval(1580.0, 0.0, Z_95);
        assert_eq!(interval.low, 1580.0);
        assert_eq!(interval.high, 1580.0);
        assert!(interval.contains(1580.0));
    }

    #[test]
    fn test_custom_z() {
        let interval = confidence_interval(0.0, 2.0, 1.0);
        assert_eq!(interval.low, -2.0);
        assert_eq!(interval.high, 2.0);
    }
}
