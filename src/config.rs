// src/config.rs - Single configuration file
//! Configuration inputs for the binding layer.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! board = "compact"
//!
//! [features]
//! variable_spindle = true
//! mist_coolant = true
//!
//! [spindle_pwm]
//! min_value = 1
//! frequency = "1khz"
//!
//! [control]
//! invert = ["reset", "feed_hold"]
//! ```
//!
//! Every field has a documented default; an empty file resolves the
//! compact board with binary spindle control.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{
    resolve, validate, BindingError, BoardVariant, FeatureFlags, LogicalSignal, Overrides,
    PwmFrequency, ResolvedBindingSet,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration struct: board selector, feature flags, and the
/// optional numeric overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_board")]
    pub board: String,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub spindle_pwm: SpindlePwmConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board: default_board(),
            features: FeatureFlags::default(),
            spindle_pwm: SpindlePwmConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

/// Spindle PWM overrides, used only when variable spindle is enabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpindlePwmConfig {
    /// Lowest nonzero compare value. Zero is rejected at resolve time:
    /// the compare unit cannot distinguish "off" from minimum duty there.
    #[serde(default = "default_pwm_min")]
    pub min_value: u8,
    #[serde(default)]
    pub frequency: PwmFrequency,
}

impl Default for SpindlePwmConfig {
    fn default() -> Self {
        Self {
            min_value: default_pwm_min(),
            frequency: PwmFrequency::default(),
        }
    }
}

/// Control input configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Control inputs whose readings are inverted. Omitted means the whole
    /// control group.
    #[serde(default)]
    pub invert: Option<Vec<ControlInput>>,
}

/// Nameable control inputs for the invert list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlInput {
    Reset,
    FeedHold,
    CycleStart,
    SafetyDoor,
}

impl ControlInput {
    pub fn signal(self) -> LogicalSignal {
        match self {
            ControlInput::Reset => LogicalSignal::ControlReset,
            ControlInput::FeedHold => LogicalSignal::ControlFeedHold,
            ControlInput::CycleStart => LogicalSignal::ControlCycleStart,
            ControlInput::SafetyDoor => LogicalSignal::ControlSafetyDoor,
        }
    }
}

// Default value functions
fn default_board() -> String {
    "compact".to_string()
}
fn default_pwm_min() -> u8 {
    1
}

impl Config {
    /// Run the full configuration pass: parse the board selector, resolve
    /// the variant table under the configured flags, and validate. The
    /// returned set is read-only for the remaining lifetime of the
    /// program.
    pub fn resolve(&self) -> Result<ResolvedBindingSet, BindingError> {
        let variant = BoardVariant::from_name(&self.board)?;
        let overrides = Overrides {
            pwm_min_value: self.spindle_pwm.min_value,
            pwm_frequency: self.spindle_pwm.frequency,
            control_invert: self
                .control
                .invert
                .as_ref()
                .map(|inputs| inputs.iter().map(|i| i.signal()).collect()),
        };
        let set = resolve(variant, self.features, &overrides)?;
        validate(&set)?;
        Ok(set)
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.board, "compact");
        assert!(!config.features.variable_spindle);
        assert!(config.features.safety_door_shares_feed_hold);
        assert_eq!(config.spindle_pwm.min_value, 1);
        assert_eq!(config.spindle_pwm.frequency, PwmFrequency::Khz1);
        assert!(config.control.invert.is_none());
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "board = 'extended'\n[features]\nvariable_spindle = true").unwrap();
        file.flush().unwrap();
        let config = load_config(file_path.to_str().unwrap()).unwrap();
        assert_eq!(config.board, "extended");
        assert!(config.features.variable_spindle);
        // Defaults for missing fields
        assert!(config.features.safety_door_shares_feed_hold);
        assert_eq!(config.spindle_pwm.min_value, 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_file.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_board_rejected_at_resolve() {
        let config = Config {
            board: "teensy41".to_string(),
            ..Config::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, BindingError::UnsupportedVariant(_)));
    }

    #[test]
    fn test_unknown_invert_name_rejected_at_parse() {
        let result: Result<Config, _> = toml::from_str("[control]\ninvert = ['estop']");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_through_config() {
        let toml = r#"
        board = "compact"

        [features]
        variable_spindle = true

        [spindle_pwm]
        min_value = 10
        frequency = "8khz"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let set = config.resolve().unwrap();
        let pwm = set.pwm.unwrap();
        assert_eq!(pwm.min_value, 10);
        assert_eq!(pwm.range, 245);
        assert_eq!(pwm.prescaler_bits, 0b010);
    }
}
