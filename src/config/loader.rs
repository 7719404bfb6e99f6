//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::BenefitConfig;

/// The file name looked up inside the configuration directory.
const CONFIG_FILE_NAME: &str = "benefit.yaml";

/// Loads and validates the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── benefit.yaml   # Instalment limits, benefit caps, pay subsidy tiers
/// ```
///
/// # Example
///
/// ```no_run
/// use benefit_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// let threshold = loader.config().instalments.threshold;
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: BenefitConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - `benefit.yaml` is missing (`ConfigNotFound`)
    /// - the file is not valid YAML or lacks a field (`ConfigParseError`)
    /// - a value is out of range (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config_path = path.as_ref().join(CONFIG_FILE_NAME);
        let path_str = config_path.display().to_string();

        let content = fs::read_to_string(&config_path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content).map_err(|err| match err {
            EngineError::ConfigParseError { message, .. } => EngineError::ConfigParseError {
                path: path_str,
                message,
            },
            other => other,
        })
    }

    /// Parses and validates configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: BenefitConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        Self::validate(&config)?;
        Ok(Self { config })
    }

    /// Wraps an already constructed configuration after validating it.
    pub fn from_config(config: BenefitConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &BenefitConfig) -> EngineResult<()> {
        let instalments = &config.instalments;
        if instalments.threshold < Decimal::ZERO {
            return Err(invalid("instalments.threshold", "must not be negative"));
        }
        if instalments.first_instalment_limit < Decimal::ZERO
            || instalments.first_instalment_limit > instalments.threshold
        {
            return Err(invalid(
                "instalments.first_instalment_limit",
                "must be between zero and the instalment threshold",
            ));
        }
        if instalments.second_instalment_delay_days < 0 {
            return Err(invalid(
                "instalments.second_instalment_delay_days",
                "must not be negative",
            ));
        }
        if config.pay_subsidy.default_work_time_percent <= Decimal::ZERO {
            return Err(invalid(
                "pay_subsidy.default_work_time_percent",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &BenefitConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> BenefitConfig {
        self.config
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config(), &BenefitConfig::default());
    }

    #[test]
    fn test_shipped_tier_caps() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let pay_subsidy = &loader.config().pay_subsidy;

        assert_eq!(pay_subsidy.max_for_percent(100), dec("2020"));
        assert_eq!(pay_subsidy.max_for_percent(70), dec("1770"));
        assert_eq!(pay_subsidy.max_for_percent(50), dec("1260"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("benefit.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml_returns_parse_error() {
        let result = ConfigLoader::from_yaml_str("instalments: [unclosed");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_first_instalment_above_threshold_is_rejected() {
        let mut config = BenefitConfig::default();
        config.instalments.first_instalment_limit = dec("40000");

        match ConfigLoader::from_config(config) {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "instalments.first_instalment_limit");
            }
            other => panic!("Expected InvalidConfig error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_default_work_time_is_rejected() {
        let mut config = BenefitConfig::default();
        config.pay_subsidy.default_work_time_percent = Decimal::ZERO;

        assert!(matches!(
            ConfigLoader::from_config(config),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_inline_yaml_overrides_threshold() {
        let yaml = r#"
instalments:
  enabled: true
  threshold: "20000"
  first_instalment_limit: "5000"
  second_instalment_delay_days: 90
benefit:
  max_monthly_benefit: "800"
  salary_benefit_new_max: "1500"
  employee_benefit_monthly: "500"
pay_subsidy:
  default_work_time_percent: "65"
  full_time_work_fraction: "0.65"
  employer_cost_multiplier: "1.23"
  max_full: "2020"
  max_70_percent: "1770"
  max_other: "1260"
"#;
        let loader = ConfigLoader::from_yaml_str(yaml).unwrap();
        let instalments = &loader.config().instalments;

        assert!(instalments.enabled);
        assert_eq!(instalments.threshold, dec("20000"));
        assert_eq!(instalments.first_instalment_limit, dec("5000"));
        assert_eq!(instalments.second_instalment_delay_days, 90);
    }
}
