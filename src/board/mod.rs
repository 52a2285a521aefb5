// src/board/mod.rs - Hardware-resource binding layer
//! Maps the controller's logical signals (step/direction per axis, limits,
//! spindle, coolant, operator controls, probe) onto physical port groups,
//! bit positions, interrupt banks, and PWM timer units for a selectable
//! board variant.
//!
//! The pipeline runs once, synchronously, at configuration time:
//! variant table -> feature resolver -> consistency validator. The
//! resulting [`ResolvedBindingSet`] is read-only for the rest of the
//! program and may be read from any context without synchronization;
//! ISR-setup code must not run before validation has succeeded.

pub mod access;
pub mod descriptor;
pub mod pwm;
pub mod resolver;
pub mod signal;
pub mod tables;
pub mod validator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use descriptor::{Binding, CompositeBinding, PinChangeBank, PortGroup, ResourceDescriptor};
pub use pwm::{PwmConfig, PwmFrequency};
pub use resolver::{resolve, Overrides, ResolvedBindingSet};
pub use signal::{LogicalSignal, SignalClass};
pub use tables::{SerialVectors, SignalSpec};
pub use validator::validate;

/// Build-time feature toggles that steer pin selection. Fixed once the
/// resolve step has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Variable-speed spindle over hardware PWM.
    #[serde(default)]
    pub variable_spindle: bool,
    /// Repurpose the spindle direction pin as spindle enable.
    #[serde(default)]
    pub spindle_dir_as_enable: bool,
    /// Route the mist coolant output.
    #[serde(default)]
    pub mist_coolant: bool,
    /// Safety door input rides the feed-hold pin.
    #[serde(default = "default_safety_door_shared")]
    pub safety_door_shares_feed_hold: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            variable_spindle: false,
            spindle_dir_as_enable: false,
            mist_coolant: false,
            safety_door_shares_feed_hold: default_safety_door_shared(),
        }
    }
}

fn default_safety_door_shared() -> bool {
    true
}

/// Configuration-time faults. All of them are fatal: they indicate a
/// static authoring or configuration defect, never a transient condition,
/// and are raised before any hardware access occurs.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("unsupported board variant `{0}`")]
    UnsupportedVariant(String),
    #[error("variant {variant:?} has no binding for required signal {signal:?}")]
    UnmappedSignal {
        variant: BoardVariant,
        signal: LogicalSignal,
    },
    #[error("features select {first:?} and {second:?} onto the same pin (port {port} bit {bit})")]
    ConflictingFeatureSelection {
        first: LogicalSignal,
        second: LogicalSignal,
        port: PortGroup,
        bit: u8,
    },
    #[error("inconsistent binding for {group}: {reason}")]
    InconsistentBinding { group: String, reason: String },
}

/// The closed set of supported boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardVariant {
    /// Three-port compact board (Uno-class processor).
    Compact,
    /// Extended board with dedicated coolant and control ports and a
    /// second PWM timer (Mega/RAMPS-class processor).
    Extended,
}

impl BoardVariant {
    pub const ALL: [BoardVariant; 2] = [BoardVariant::Compact, BoardVariant::Extended];

    pub fn from_name(name: &str) -> Result<Self, BindingError> {
        match name {
            "compact" => Ok(BoardVariant::Compact),
            "extended" => Ok(BoardVariant::Extended),
            other => Err(BindingError::UnsupportedVariant(other.to_string())),
        }
    }

    pub fn table(self) -> &'static [SignalSpec] {
        match self {
            BoardVariant::Compact => tables::COMPACT_TABLE,
            BoardVariant::Extended => tables::EXTENDED_TABLE,
        }
    }

    /// Raw table row for one signal, before feature resolution.
    pub fn lookup(self, signal: LogicalSignal) -> Result<&'static SignalSpec, BindingError> {
        self.table()
            .iter()
            .find(|spec| spec.signal == signal)
            .ok_or(BindingError::UnmappedSignal {
                variant: self,
                signal,
            })
    }

    pub fn serial_vectors(self) -> SerialVectors {
        match self {
            BoardVariant::Compact => tables::COMPACT_SERIAL,
            BoardVariant::Extended => tables::EXTENDED_SERIAL,
        }
    }

    pub fn pwm_timer(self) -> pwm::PwmTimer {
        match self {
            BoardVariant::Compact => pwm::COMPACT_PWM_TIMER,
            BoardVariant::Extended => pwm::EXTENDED_PWM_TIMER,
        }
    }
}
