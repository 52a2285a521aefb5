//! Physical resource descriptors: port groups, bit positions, and the
//! pin-change interrupt plumbing a signal binding points at.

use std::fmt;

/// I/O port group identifier. Each group carries a paired data-direction
/// register and input register on the silicon; descriptors still name the
/// direction register explicitly so the validator can check the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortGroup {
    A,
    B,
    C,
    D,
    G,
    H,
    K,
}

impl PortGroup {
    /// Register identifier of the output latch, e.g. `PORTB`.
    pub fn output_register(self) -> String {
        format!("PORT{:?}", self)
    }

    /// Register identifier of the paired data-direction register, e.g. `DDRB`.
    pub fn direction_register(self) -> String {
        format!("DDR{:?}", self)
    }

    /// Register identifier of the input latch, e.g. `PINB`.
    pub fn input_register(self) -> String {
        format!("PIN{:?}", self)
    }
}

impl fmt::Display for PortGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One of the processor's pin-change interrupt banks. A bank bundles the
/// enable bit, the ISR vector, and the per-pin mask register; input groups
/// that fire on edge changes (limits, controls) are tied to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinChangeBank {
    Bank0,
    Bank1,
    Bank2,
}

impl PinChangeBank {
    pub fn enable_bit(self) -> &'static str {
        match self {
            PinChangeBank::Bank0 => "PCIE0",
            PinChangeBank::Bank1 => "PCIE1",
            PinChangeBank::Bank2 => "PCIE2",
        }
    }

    pub fn vector(self) -> &'static str {
        match self {
            PinChangeBank::Bank0 => "PCINT0_vect",
            PinChangeBank::Bank1 => "PCINT1_vect",
            PinChangeBank::Bank2 => "PCINT2_vect",
        }
    }

    pub fn mask_register(self) -> &'static str {
        match self {
            PinChangeBank::Bank0 => "PCMSK0",
            PinChangeBank::Bank1 => "PCMSK1",
            PinChangeBank::Bank2 => "PCMSK2",
        }
    }
}

/// A single physical hardware location: port group, bit position, the
/// derived single-bit mask, the direction register that owns the pin, a
/// human-readable pin annotation kept for traceability, and the pin-change
/// bank for interrupt-driven inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub port: PortGroup,
    pub bit: u8,
    pub mask: u8,
    pub ddr: PortGroup,
    /// Documented physical pin, e.g. "Uno Digital Pin 11". Not consumed
    /// programmatically.
    pub pin_note: &'static str,
    pub interrupt: Option<PinChangeBank>,
}

/// Output or plain polled-input pin on `port` at `bit`.
pub const fn pin(port: PortGroup, bit: u8, pin_note: &'static str) -> ResourceDescriptor {
    ResourceDescriptor {
        port,
        bit,
        mask: 1 << bit,
        ddr: port,
        pin_note,
        interrupt: None,
    }
}

/// Edge-sensitive input pin wired to a pin-change interrupt bank.
pub const fn input_pin(
    port: PortGroup,
    bit: u8,
    pin_note: &'static str,
    bank: PinChangeBank,
) -> ResourceDescriptor {
    ResourceDescriptor {
        port,
        bit,
        mask: 1 << bit,
        ddr: port,
        pin_note,
        interrupt: Some(bank),
    }
}

/// Resolution result for one logical signal. Signals dropped by the active
/// feature selection are `Absent`, never a zeroed descriptor, so consumers
/// can tell "no such pin" from "pin 0".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Single(ResourceDescriptor),
    Absent,
}

impl Binding {
    pub fn descriptor(&self) -> Option<&ResourceDescriptor> {
        match self {
            Binding::Single(d) => Some(d),
            Binding::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Binding::Absent)
    }
}

/// Group view over a co-located signal class: one port, one direction
/// register, the union of the member masks, and the shared interrupt bank
/// for edge-sensitive groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeBinding {
    pub port: PortGroup,
    pub ddr: PortGroup,
    pub mask: u8,
    pub interrupt: Option<PinChangeBank>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bit_mask_derivation() {
        let d = pin(PortGroup::D, 2, "Uno Digital Pin 2");
        assert_eq!(d.mask, 0b0000_0100);
        assert_eq!(d.ddr, PortGroup::D);
        assert!(d.interrupt.is_none());
    }

    #[test]
    fn test_register_identifiers() {
        assert_eq!(PortGroup::B.output_register(), "PORTB");
        assert_eq!(PortGroup::B.direction_register(), "DDRB");
        assert_eq!(PortGroup::K.input_register(), "PINK");
        assert_eq!(PinChangeBank::Bank1.vector(), "PCINT1_vect");
        assert_eq!(PinChangeBank::Bank2.mask_register(), "PCMSK2");
    }
}
