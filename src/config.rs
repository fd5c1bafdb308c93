use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ATM_KEY;
use crate::model_params::ModelParameters;
use crate::scenarios::ScenarioSet;

/// Everything needed to run the P&L engine apart from the vega grids.
///
/// ```toml
/// current_spot = 5800.0
/// reference_date = "2025-01-02"
///
/// [params]
/// spot_vol_beta = -4.0
/// skew_factor = 1.5
///
/// [[scenarios]]
/// label = "down_25"
/// spot_change = -0.025
///
/// [[scenarios]]
/// label = "atm"
/// spot_change = 0.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Model parameters; omitted fields keep their defaults
    #[serde(default)]
    pub params: ModelParameters,

    /// Spot scenarios in display order
    #[serde(default)]
    pub scenarios: ScenarioSet,

    /// Spot level used to convert spot-change fractions to price moves
    #[serde(default = "default_current_spot")]
    pub current_spot: f64,

    /// Valuation date for days-to-expiry; today when absent
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

fn default_current_spot() -> f64 {
    100.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: ModelParameters::default(),
            scenarios: ScenarioSet::default(),
            current_spot: default_current_spot(),
            reference_date: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(source).map_err(|e| anyhow!("Invalid engine config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let tenor = self.params.reference_tenor_days;
        if tenor.is_nan() || tenor <= 0.0 {
            return Err(anyhow!(
                "reference_tenor_days must be positive, got {}",
                tenor
            ));
        }
        if !self.current_spot.is_finite() || self.current_spot <= 0.0 {
            return Err(anyhow!(
                "current_spot must be a positive number, got {}",
                self.current_spot
            ));
        }
        match self.scenarios.get(ATM_KEY) {
            Some(change) if change == 0.0 => Ok(()),
            Some(change) => Err(anyhow!(
                "Scenario '{}' must have a zero spot change, got {}",
                ATM_KEY,
                change
            )),
            None => Err(anyhow!("Scenario set must contain '{}'", ATM_KEY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scenarios.len(), 7);
    }

    #[test]
    fn test_partial_params_and_ordered_scenarios() {
        let source = r#"
            current_spot = 5800.0
            reference_date = "2025-01-02"

            [params]
            spot_vol_beta = -4.0

            [[scenarios]]
            label = "up_25"
            spot_change = 0.025

            [[scenarios]]
            label = "atm"
            spot_change = 0.0

            [[scenarios]]
            label = "down_25"
            spot_change = -0.025
        "#;
        let config = EngineConfig::from_toml_str(source).unwrap();

        assert_eq!(config.current_spot, 5800.0);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert_eq!(config.params.spot_vol_beta, -4.0);
        assert_eq!(config.params.skew_factor, 1.0);

        let labels: Vec<&str> = config.scenarios.labels().collect();
        assert_eq!(labels, vec!["up_25", "atm", "down_25"]);
    }

    #[test]
    fn test_rejects_non_positive_tenor() {
        let err = EngineConfig::from_toml_str("[params]\nreference_tenor_days = 0.0\n")
            .unwrap_err();
        assert!(err.to_string().contains("reference_tenor_days"));
    }

    #[test]
    fn test_rejects_missing_or_shifted_atm() {
        let missing = r#"
            [[scenarios]]
            label = "up_25"
            spot_change = 0.025
        "#;
        assert!(EngineConfig::from_toml_str(missing).is_err());

        let shifted = r#"
            [[scenarios]]
            label = "atm"
            spot_change = 0.01
        "#;
        let err = EngineConfig::from_toml_str(shifted).unwrap_err();
        assert!(err.to_string().contains("zero spot change"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("current_spot = \"high\"").unwrap_err();
        assert!(err.to_string().starts_with("Invalid engine config"));
    }
}
