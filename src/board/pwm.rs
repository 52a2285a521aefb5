//! Spindle PWM channel parameters. Derived once at configuration time from
//! the resolved spindle PWM binding; the mapping from a logical speed
//! fraction to a compare value is affine and monotonic.

use serde::{Deserialize, Serialize};

use super::descriptor::ResourceDescriptor;
use super::{BindingError, BoardVariant};

/// Base PWM frequency tier. The prescaler is a fixed table keyed by tier;
/// the chosen clock-select pattern is stored, never recomputed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PwmFrequency {
    /// ~0.98 kHz, 1/64 prescaler. The shipped default.
    #[serde(rename = "1khz")]
    Khz1,
    /// ~1.96 kHz, 1/32 prescaler.
    #[serde(rename = "2khz")]
    Khz2,
    /// ~7.8 kHz, 1/8 prescaler.
    #[serde(rename = "8khz")]
    Khz8,
    /// 62.5 kHz, prescaler disabled.
    #[serde(rename = "62.5khz")]
    Khz62_5,
}

impl Default for PwmFrequency {
    fn default() -> Self {
        PwmFrequency::Khz1
    }
}

impl PwmFrequency {
    /// Clock-select bit pattern for the timer's control register B.
    pub fn clock_select_bits(self) -> u8 {
        match self {
            PwmFrequency::Khz1 => 1 << 2,        // CSx2, 1/64
            PwmFrequency::Khz2 => (1 << 1) | 1,  // CSx1|CSx0, 1/32
            PwmFrequency::Khz8 => 1 << 1,        // CSx1, 1/8
            PwmFrequency::Khz62_5 => 1,          // CSx0, no prescaling
        }
    }
}

/// Identity of the timer/compare unit driving the PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTimer {
    pub compare_register: &'static str,
    pub control_register_a: &'static str,
    pub control_register_b: &'static str,
    /// Waveform-generation mask written to control register A to select
    /// 8-bit fast PWM mode.
    pub mode_mask: u8,
    /// Bit index of the output-compare enable in control register A.
    pub output_compare_bit: u8,
    /// Input-capture register used as the timer match on boards whose
    /// timer needs an explicit top value.
    pub match_register: Option<&'static str>,
}

pub const COMPACT_PWM_TIMER: PwmTimer = PwmTimer {
    compare_register: "OCR2A",
    control_register_a: "TCCR2A",
    control_register_b: "TCCR2B",
    mode_mask: 0b0000_0011, // WGM20|WGM21
    output_compare_bit: 7,  // COM2A1
    match_register: None,
};

pub const EXTENDED_PWM_TIMER: PwmTimer = PwmTimer {
    compare_register: "OCR4A",
    control_register_a: "TCCR4A",
    control_register_b: "TCCR4B",
    mode_mask: 0b1000_0010, // COM4A1|WGM41
    output_compare_bit: 7,  // COM4A1
    match_register: Some("ICR4"),
};

/// Numeric spindle PWM parameters, present only when variable spindle is
/// enabled. Fast PWM mode fixes the top value at 255; the minimum must stay
/// above zero so "off" and "minimum speed" remain distinguishable on the
/// compare unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    pub max_value: u8,
    pub min_value: u8,
    pub off_value: u8,
    pub range: u8,
    pub frequency: PwmFrequency,
    pub prescaler_bits: u8,
    pub timer: PwmTimer,
    pub output: ResourceDescriptor,
}

impl PwmConfig {
    pub fn derive(
        variant: BoardVariant,
        output: ResourceDescriptor,
        min_value: u8,
        frequency: PwmFrequency,
    ) -> Result<PwmConfig, BindingError> {
        if min_value == 0 {
            return Err(BindingError::InconsistentBinding {
                group: "spindle_pwm".to_string(),
                reason: "min_value must be greater than zero".to_string(),
            });
        }
        let max_value = 255u8;
        if min_value >= max_value {
            return Err(BindingError::InconsistentBinding {
                group: "spindle_pwm".to_string(),
                reason: format!("min_value {} must be below max_value {}", min_value, max_value),
            });
        }
        Ok(PwmConfig {
            max_value,
            min_value,
            off_value: 0,
            range: max_value - min_value,
            frequency,
            prescaler_bits: frequency.clock_select_bits(),
            timer: variant.pwm_timer(),
            output,
        })
    }

    /// Map a logical speed fraction in [0, 1] to a compare value. Zero is
    /// special-cased to the off value, distinct from minimum nonzero duty.
    pub fn compare_value(&self, fraction: f64) -> u8 {
        if fraction <= 0.0 {
            return self.off_value;
        }
        let f = fraction.min(1.0);
        (f64::from(self.min_value) + f * f64::from(self.range)).round() as u8
    }
}
