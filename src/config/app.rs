//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! skill-estimate tool, including TOML file loading, environment variable
//! overrides and validation.

use crate::config::rating::EstimatorSettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub estimator: EstimatorSettings,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name shown in the startup banner and the root tracing span
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "skill-estimate".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Parse an environment variable into `target` if it is set
fn override_from_env<T: FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("Invalid configuration file: {}", e))
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        override_from_env("SERVICE_NAME", &mut self.service.name)?;
        override_from_env("LOG_LEVEL", &mut self.service.log_level)?;

        // Estimator selection
        if let Ok(method) = env::var("ESTIMATOR_METHOD") {
            self.estimator.method = method.parse()?;
        }

        // Weighted gradient descent
        let wgd = &mut self.estimator.wgd;
        override_from_env("WGD_INITIAL_SCORE", &mut wgd.initial_score)?;
        override_from_env("WGD_LEARNING_RATE", &mut wgd.learning_rate)?;
        override_from_env("WGD_MAX_ITER", &mut wgd.max_iter)?;
        override_from_env("WGD_DECAY_FACTOR", &mut wgd.decay_factor)?;

        // Glicko-2
        let glicko2 = &mut self.estimator.glicko2;
        override_from_env("GLICKO2_INITIAL_SCORE", &mut glicko2.initial_score)?;
        override_from_env("GLICKO2_INITIAL_RD", &mut glicko2.initial_rd)?;
        override_from_env("GLICKO2_INITIAL_VOLATILITY", &mut glicko2.initial_volatility)?;
        override_from_env("GLICKO2_TAU", &mut glicko2.tau)?;
        override_from_env(
            "GLICKO2_MIN_OPPONENT_DEVIATION",
            &mut glicko2.min_opponent_deviation,
        )?;

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.estimator.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::EstimatorKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.estimator.method, EstimatorKind::Wgd);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = AppConfig::from_toml(
            r#"
            [service]
            log_level = "debug"

            [estimator]
            method = "glicko2"

            [estimator.wgd]
            decay_factor = 0.99

            [estimator.glicko2]
            tau = 0.3
            min_opponent_deviation = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.service.name, "skill-estimate");
        assert_eq!(config.estimator.method, EstimatorKind::Glicko2);
        assert_eq!(config.estimator.wgd.decay_factor, 0.99);
        assert_eq!(config.estimator.wgd.learning_rate, 0.1);
        assert_eq!(config.estimator.glicko2.tau, 0.3);
        assert_eq!(config.estimator.glicko2.min_opponent_deviation, 50.0);
        assert_eq!(config.estimator.glicko2.initial_rd, 350.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_service_name_from_toml() {
        let config = AppConfig::from_toml("[service]\nname = \"rating-lab\"\n").unwrap();
        assert_eq!(config.service.name, "rating-lab");
        assert!(validate_config(&config).is_ok());

        let config = AppConfig::from_toml("[service]\nname = \"\"\n").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(AppConfig::from_toml("[estimator\nmethod = ").is_err());
        assert!(AppConfig::from_toml("[estimator]\nmethod = \"elo\"").is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.estimator.wgd.max_iter = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.estimator.glicko2.initial_volatility = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_override_from_env() {
        let mut value = 0.5_f64;
        std::env::set_var("SKILL_ESTIMATE_TEST_OVERRIDE_OK", "0.25");
        override_from_env("SKILL_ESTIMATE_TEST_OVERRIDE_OK", &mut value).unwrap();
        assert_eq!(value, 0.25);

        std::env::set_var("SKILL_ESTIMATE_TEST_OVERRIDE_BAD", "quarter");
        assert!(override_from_env("SKILL_ESTIMATE_TEST_OVERRIDE_BAD", &mut value).is_err());
        assert_eq!(value, 0.25);

        override_from_env("SKILL_ESTIMATE_TEST_OVERRIDE_UNSET", &mut value).unwrap();
        assert_eq!(value, 0.25);
    }
}
