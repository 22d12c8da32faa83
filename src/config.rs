// 7.0 config.rs: caller-side settings in one place. alert thresholds, margin mode,
// the default what-if ladder. risk tiers and maintenance ratio are NOT here; they are fixed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::alerts::AlertConfig;
use crate::margin::MarginMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub alerts: AlertConfig,
    // which liquidation model position reports use
    pub margin_mode: MarginMode,
    // uniform shocks (in %) run by the stress ladder
    pub stress_shocks: Vec<Decimal>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alerts: AlertConfig::default(),
            margin_mode: MarginMode::Cross,
            stress_shocks: vec![dec!(-20), dec!(-10), dec!(-5), dec!(0), dec!(5), dec!(10), dec!(20)],
        }
    }
}

impl EngineConfig {
    // alert early, wide ladder
    pub fn conservative() -> Self {
        let mut config = Self::default();
        config.alerts.warning_threshold = dec!(60);
        config.alerts.critical_threshold = dec!(80);
        config.alerts.cooldown_ms = 300_000; // 5 minutes
        config.stress_shocks = vec![dec!(-50), dec!(-30), dec!(-20), dec!(-10), dec!(0), dec!(10), dec!(20), dec!(30), dec!(50)];
        config
    }

    // late alerts, isolated liquidation view
    pub fn aggressive() -> Self {
        let mut config = Self::default();
        config.alerts.warning_threshold = dec!(90);
        config.alerts.critical_threshold = dec!(97);
        config.alerts.cooldown_ms = 30_000;
        config.margin_mode = MarginMode::Isolated;
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.alerts.validate()?;

        if self.stress_shocks.iter().any(|s| *s <= dec!(-100)) {
            return Err(ConfigError::InvalidStress {
                reason: "shocks of -100% or worse zero every price".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid alert config: {reason}")]
    InvalidAlert { reason: String },

    #[error("invalid stress ladder: {reason}")]
    InvalidStress { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Default,
    Conservative,
    Aggressive,
}

impl Environment {
    pub fn config(&self) -> EngineConfig {
        match self {
            Environment::Default => EngineConfig::default(),
            Environment::Conservative => EngineConfig::conservative(),
            Environment::Aggressive => EngineConfig::aggressive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.margin_mode, MarginMode::Cross);
        assert_eq!(config.alerts.warning_threshold, dec!(75));
    }

    #[test]
    fn test_presets_valid() {
        assert!(EngineConfig::conservative().validate().is_ok());
        assert!(EngineConfig::aggressive().validate().is_ok());
        assert_eq!(EngineConfig::aggressive().margin_mode, MarginMode::Isolated);
    }

    #[test]
    fn test_environment_presets() {
        assert!(Environment::Default.config().validate().is_ok());
        assert!(Environment::Conservative.config().validate().is_ok());
        assert!(Environment::Aggressive.config().validate().is_ok());
    }

    #[test]
    fn test_invalid_alerts_bubble_up() {
        let mut config = EngineConfig::default();
        config.alerts.critical_threshold = dec!(50);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAlert { .. })));
    }

    #[test]
    fn test_invalid_stress_ladder() {
        let mut config = EngineConfig::default();
        config.stress_shocks.push(dec!(-100));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStress { .. })));
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::conservative();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_environment_serde_names() {
        let json = serde_json::to_string(&Environment::Conservative).unwrap();
        assert_eq!(json, "\"conservative\"");
    }
}
