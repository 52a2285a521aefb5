//! Resource access seam. The binding layer only produces descriptors; the
//! component that performs actual I/O implements this trait and is handed
//! descriptors by reference.

use std::collections::HashMap;

use super::descriptor::{PortGroup, ResourceDescriptor};

/// Capability interface for touching the hardware a descriptor points at.
/// Implemented by the real register-level driver on the target and by
/// [`MemoryPort`] on the host.
pub trait ResourceAccessPort {
    fn set_direction(&mut self, descriptor: &ResourceDescriptor, output: bool);
    fn write(&mut self, descriptor: &ResourceDescriptor, high: bool);
    fn read(&self, descriptor: &ResourceDescriptor) -> bool;
}

/// In-memory port latches, used by host-side tests and the simulator in
/// place of real registers.
#[derive(Debug, Default)]
pub struct MemoryPort {
    levels: HashMap<PortGroup, u8>,
    directions: HashMap<PortGroup, u8>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw latch value for a port, as a register dump would show it.
    pub fn level(&self, port: PortGroup) -> u8 {
        self.levels.get(&port).copied().unwrap_or(0)
    }

    pub fn direction_bits(&self, port: PortGroup) -> u8 {
        self.directions.get(&port).copied().unwrap_or(0)
    }

    /// Drive an input pin from the outside, e.g. a simulated limit switch.
    pub fn inject(&mut self, descriptor: &ResourceDescriptor, high: bool) {
        let level = self.levels.entry(descriptor.port).or_insert(0);
        if high {
            *level |= descriptor.mask;
        } else {
            *level &= !descriptor.mask;
        }
    }
}

impl ResourceAccessPort for MemoryPort {
    fn set_direction(&mut self, descriptor: &ResourceDescriptor, output: bool) {
        let bits = self.directions.entry(descriptor.ddr).or_insert(0);
        if output {
            *bits |= descriptor.mask;
        } else {
            *bits &= !descriptor.mask;
        }
    }

    fn write(&mut self, descriptor: &ResourceDescriptor, high: bool) {
        self.inject(descriptor, high);
    }

    fn read(&self, descriptor: &ResourceDescriptor) -> bool {
        self.level(descriptor.port) & descriptor.mask != 0
    }
}
