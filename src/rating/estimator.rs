//! Rating estimator trait and estimator selection
//!
//! This module defines the interface shared by the weighted gradient descent
//! and Glicko-2 estimators, and the runtime switch between them.

use crate::error::{EstimationError, Result};
use crate::rating::glicko2::{Glicko2Config, Glicko2Estimator};
use crate::rating::wgd::{WgdConfig, WgdEstimator};
use crate::types::{Estimate, Record};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trait for estimating a rating from an ordered sequence of outcomes
pub trait RatingEstimator: Send + Sync {
    /// Estimate a rating and 95% confidence interval
    ///
    /// # Arguments
    /// * `records` - Outcomes ordered oldest first
    ///
    /// # Errors
    /// `EmptyDataset` for an empty slice, `MalformedRecord` for non-finite
    /// difficulties, plus estimator-specific failures.
    fn estimate(&self, records: &[Record]) -> Result<Estimate>;

    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Which estimator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[default]
    Wgd,
    Glicko2,
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorKind::Wgd => write!(f, "wgd"),
            EstimatorKind::Glicko2 => write!(f, "glicko2"),
        }
    }
}

impl FromStr for EstimatorKind {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wgd" | "gradient" => Ok(EstimatorKind::Wgd),
            "glicko2" | "glicko-2" | "glicko" => Ok(EstimatorKind::Glicko2),
            other => Err(EstimationError::Configuration {
                message: format!("Unknown estimator method: {}", other),
            }),
        }
    }
}

impl EstimatorKind {
    /// Build the selected estimator from its configuration
    pub fn build(
        self,
        wgd: &WgdConfig,
        glicko2: &Glicko2Config,
    ) -> Result<Box<dyn RatingEstimator>> {
        Ok(match self {
            EstimatorKind::Wgd => Box::new(WgdEstimator::new(wgd.clone())?),
            EstimatorKind::Glicko2 => Box::new(Glicko2Estimator::new(glicko2.clone())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimator_kind_parsing() {
        assert_eq!("wgd".parse::<EstimatorKind>().unwrap(), EstimatorKind::Wgd);
        assert_eq!(
            "Glicko2".parse::<EstimatorKind>().unwrap(),
            EstimatorKind::Glicko2
        );
        assert_eq!(
            "glicko-2".parse::<EstimatorKind>().unwrap(),
            EstimatorKind::Glicko2
        );
        assert!("elo".parse::<EstimatorKind>().is_err());
    }

    #[test]
    fn test_estimator_kind_display_round_trip() {
        for kind in [EstimatorKind::Wgd, EstimatorKind::Glicko2] {
            assert_eq!(kind.to_string().parse::<EstimatorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_dispatches() {
        let wgd = WgdConfig {
            max_iter: 10,
            ..WgdConfig::default()
        };
        let glicko2 = Glicko2Config::default();

        let estimator = EstimatorKind::Wgd.build(&wgd, &glicko2).unwrap();
        assert_eq!(estimator.name(), "wgd");
        assert_eq!(estimator.config()["max_iter"], 10);

        let estimator = EstimatorKind::Glicko2.build(&wgd, &glicko2).unwrap();
        assert_eq!(estimator.name(), "glicko2");
        assert_eq!(estimator.config()["tau"], 0.5);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let wgd = WgdConfig {
            max_iter: 0,
            ..WgdConfig::default()
        };
        assert!(EstimatorKind::Wgd
            .build(&wgd, &Glicko2Config::default())
            .is_err());
    }

    #[test]
    fn test_both_estimators_agree_on_direction() {
        let estimators = [
            EstimatorKind::Wgd
                .build(
                    &WgdConfig {
                        initial_score: 1500.0,
                        max_iter: 100,
                        ..WgdConfig::default()
                    },
                    &Glicko2Config::default(),
                )
                .unwrap(),
            EstimatorKind::Glicko2
                .build(
                    &WgdConfig::default(),
                    &Glicko2Config {
                        initial_score: 1500.0,
                        ..Glicko2Config::default()
                    },
                )
                .unwrap(),
        ];

        let wins = vec![Record::pass(1500.0); 4];
        let losses = vec![Record::fail(1500.0); 4];
        for estimator in &estimators {
            assert!(estimator.estimate(&wins).unwrap().rating > 1500.0);
            assert!(estimator.estimate(&losses).unwrap().rating < 1500.0);
            assert_eq!(
                estimator.estimate(&[]),
                Err(EstimationError::EmptyDataset)
            );
        }
    }
}
