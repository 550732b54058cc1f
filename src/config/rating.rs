//! Estimator configuration

use crate::rating::{EstimatorKind, Glicko2Config, WgdConfig};
use serde::{Deserialize, Serialize};

/// Which estimator runs and how each one is parameterized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    pub method: EstimatorKind,
    pub wgd: WgdConfig,
    pub glicko2: Glicko2Config,
}

impl EstimatorSettings {
    /// Validate both estimator configurations
    pub fn validate(&self) -> crate::error::Result<()> {
        self.wgd.validate()?;
        self.glicko2.validate()
    }
}
