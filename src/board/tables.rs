//! Board variant tables. Each supported board is a complete, statically
//! authored map from logical signal to physical pin, with the documented
//! physical pin numbers preserved as annotations. Alternative rows capture
//! feature-dependent pin reuse; the resolver picks exactly one per signal.

use super::descriptor::{input_pin, pin, PinChangeBank, PortGroup, ResourceDescriptor};
use super::signal::LogicalSignal;
use super::FeatureFlags;

/// Feature condition gating an alternative table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    VariableSpindle,
    SpindleDirAsEnable,
    MistCoolant,
    SafetyDoorSharesFeedHold,
}

impl When {
    pub fn active(self, flags: &FeatureFlags) -> bool {
        match self {
            When::VariableSpindle => flags.variable_spindle,
            When::SpindleDirAsEnable => flags.spindle_dir_as_enable,
            When::MistCoolant => flags.mist_coolant,
            When::SafetyDoorSharesFeedHold => flags.safety_door_shares_feed_hold,
        }
    }
}

/// One signal's row in a variant table: a default binding plus zero or more
/// feature-gated alternatives, tried in authored order before the default.
/// `None` means the signal is explicitly unbound under that selection.
#[derive(Debug, Clone, Copy)]
pub struct SignalSpec {
    pub signal: LogicalSignal,
    pub default: Option<ResourceDescriptor>,
    pub alternates: &'static [(When, Option<ResourceDescriptor>)],
}

/// Serial ISR vector identifiers, carried per variant for the serial
/// layer's interrupt installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialVectors {
    pub rx: &'static str,
    pub udre: &'static str,
}

pub const COMPACT_SERIAL: SerialVectors = SerialVectors {
    rx: "USART_RX_vect",
    udre: "USART_UDRE_vect",
};

pub const EXTENDED_SERIAL: SerialVectors = SerialVectors {
    rx: "USART0_RX_vect",
    udre: "USART0_UDRE_vect",
};

// Shared pins referenced from more than one row. The spindle direction pin
// doubles as spindle enable under the dir-as-enable selection, and the
// feed-hold pin doubles as the safety door input when sharing is on.
const COMPACT_SPINDLE_DIR: ResourceDescriptor =
    pin(PortGroup::B, 5, "Uno Digital Pin 13 (can't be pulled-high input due to LED)");
const COMPACT_FEED_HOLD: ResourceDescriptor =
    input_pin(PortGroup::C, 1, "Uno Analog Pin 1", PinChangeBank::Bank1);
const EXTENDED_SPINDLE_DIR: ResourceDescriptor = pin(PortGroup::G, 5, "Mega Digital Pin 5");
const EXTENDED_FEED_HOLD: ResourceDescriptor =
    input_pin(PortGroup::K, 1, "Mega Analog Pin 9", PinChangeBank::Bank2);

/// Compact board: three-port layout. Step and direction bits share port D,
/// stepper enable, spindle, and limits share port B, coolant, controls, and
/// probe share port C. The Z limit moves off bit 3 when variable spindle
/// claims the hardware PWM pin on Digital Pin 11.
pub const COMPACT_TABLE: &[SignalSpec] = &[
    SignalSpec {
        signal: LogicalSignal::XStep,
        default: Some(pin(PortGroup::D, 2, "Uno Digital Pin 2")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YStep,
        default: Some(pin(PortGroup::D, 3, "Uno Digital Pin 3")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZStep,
        default: Some(pin(PortGroup::D, 4, "Uno Digital Pin 4")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::XDirection,
        default: Some(pin(PortGroup::D, 5, "Uno Digital Pin 5")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YDirection,
        default: Some(pin(PortGroup::D, 6, "Uno Digital Pin 6")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZDirection,
        default: Some(pin(PortGroup::D, 7, "Uno Digital Pin 7")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::StepperEnable,
        default: Some(pin(PortGroup::B, 0, "Uno Digital Pin 8")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::XLimit,
        default: Some(input_pin(PortGroup::B, 1, "Uno Digital Pin 9", PinChangeBank::Bank0)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YLimit,
        default: Some(input_pin(PortGroup::B, 2, "Uno Digital Pin 10", PinChangeBank::Bank0)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZLimit,
        default: Some(input_pin(PortGroup::B, 3, "Uno Digital Pin 11", PinChangeBank::Bank0)),
        alternates: &[(
            When::VariableSpindle,
            Some(input_pin(PortGroup::B, 4, "Uno Digital Pin 12", PinChangeBank::Bank0)),
        )],
    },
    SignalSpec {
        signal: LogicalSignal::SpindleEnable,
        default: Some(pin(PortGroup::B, 4, "Uno Digital Pin 12")),
        alternates: &[
            (When::SpindleDirAsEnable, Some(COMPACT_SPINDLE_DIR)),
            (When::VariableSpindle, Some(pin(PortGroup::B, 3, "Uno Digital Pin 11"))),
        ],
    },
    SignalSpec {
        signal: LogicalSignal::SpindleDirection,
        default: Some(COMPACT_SPINDLE_DIR),
        alternates: &[(When::SpindleDirAsEnable, None)],
    },
    SignalSpec {
        signal: LogicalSignal::SpindlePwm,
        default: None,
        alternates: &[(
            When::VariableSpindle,
            Some(pin(PortGroup::B, 3, "Uno Digital Pin 11")),
        )],
    },
    SignalSpec {
        signal: LogicalSignal::CoolantFlood,
        default: Some(pin(PortGroup::C, 3, "Uno Analog Pin 3")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::CoolantMist,
        default: None,
        alternates: &[(When::MistCoolant, Some(pin(PortGroup::C, 4, "Uno Analog Pin 4")))],
    },
    SignalSpec {
        signal: LogicalSignal::ControlReset,
        default: Some(input_pin(PortGroup::C, 0, "Uno Analog Pin 0", PinChangeBank::Bank1)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlFeedHold,
        default: Some(COMPACT_FEED_HOLD),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlCycleStart,
        default: Some(input_pin(PortGroup::C, 2, "Uno Analog Pin 2", PinChangeBank::Bank1)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlSafetyDoor,
        default: None,
        alternates: &[(When::SafetyDoorSharesFeedHold, Some(COMPACT_FEED_HOLD))],
    },
    SignalSpec {
        signal: LogicalSignal::Probe,
        default: Some(pin(PortGroup::C, 5, "Uno Analog Pin 5")),
        alternates: &[],
    },
];

/// Extended board: step and direction bits move to port A, coolant gains a
/// dedicated pair on port H, controls and probe get port K, and the spindle
/// PWM runs on the second timer because the compact board's timer is shared
/// differently on this processor.
pub const EXTENDED_TABLE: &[SignalSpec] = &[
    SignalSpec {
        signal: LogicalSignal::XStep,
        default: Some(pin(PortGroup::A, 2, "Mega Digital Pin 24")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YStep,
        default: Some(pin(PortGroup::A, 4, "Mega Digital Pin 26")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZStep,
        default: Some(pin(PortGroup::A, 3, "Mega Digital Pin 25")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::XDirection,
        default: Some(pin(PortGroup::A, 5, "Mega Digital Pin 27")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YDirection,
        default: Some(pin(PortGroup::A, 7, "Mega Digital Pin 29")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZDirection,
        default: Some(pin(PortGroup::A, 6, "Mega Digital Pin 28")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::StepperEnable,
        default: Some(pin(PortGroup::B, 7, "Mega Digital Pin 13")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::XLimit,
        default: Some(input_pin(
            PortGroup::B,
            0,
            "Mega Digital Pin 50 (AUX-3 pin 3)",
            PinChangeBank::Bank0,
        )),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::YLimit,
        default: Some(input_pin(
            PortGroup::B,
            1,
            "Mega Digital Pin 51 (AUX-3 pin 4)",
            PinChangeBank::Bank0,
        )),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ZLimit,
        default: Some(input_pin(
            PortGroup::B,
            2,
            "Mega Digital Pin 52 (AUX-3 pin 5)",
            PinChangeBank::Bank0,
        )),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::SpindleEnable,
        default: Some(pin(PortGroup::H, 3, "Mega Digital Pin 6")),
        alternates: &[(When::SpindleDirAsEnable, Some(EXTENDED_SPINDLE_DIR))],
    },
    SignalSpec {
        signal: LogicalSignal::SpindleDirection,
        default: Some(EXTENDED_SPINDLE_DIR),
        alternates: &[(When::SpindleDirAsEnable, None)],
    },
    SignalSpec {
        signal: LogicalSignal::SpindlePwm,
        default: None,
        alternates: &[(
            When::VariableSpindle,
            Some(pin(PortGroup::H, 3, "Mega Digital Pin 6")),
        )],
    },
    SignalSpec {
        signal: LogicalSignal::CoolantFlood,
        default: Some(pin(PortGroup::H, 5, "Mega Digital Pin 8")),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::CoolantMist,
        default: None,
        alternates: &[(When::MistCoolant, Some(pin(PortGroup::H, 6, "Mega Digital Pin 9")))],
    },
    SignalSpec {
        signal: LogicalSignal::ControlReset,
        default: Some(input_pin(PortGroup::K, 0, "Mega Analog Pin 8", PinChangeBank::Bank2)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlFeedHold,
        default: Some(EXTENDED_FEED_HOLD),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlCycleStart,
        default: Some(input_pin(PortGroup::K, 2, "Mega Analog Pin 10", PinChangeBank::Bank2)),
        alternates: &[],
    },
    SignalSpec {
        signal: LogicalSignal::ControlSafetyDoor,
        default: None,
        alternates: &[(When::SafetyDoorSharesFeedHold, Some(EXTENDED_FEED_HOLD))],
    },
    SignalSpec {
        signal: LogicalSignal::Probe,
        default: Some(pin(PortGroup::K, 3, "Mega Analog Pin 11")),
        alternates: &[],
    },
];
