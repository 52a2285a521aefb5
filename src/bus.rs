// src/bus.rs - Synchronous peripheral bus driver
//! Blocking, byte-oriented, full-duplex transfers over a two-wire-clocked
//! serial bus. The driver owns the per-byte busy-wait; the shift hardware
//! sits behind [`BusLink`] so host tests can substitute a loopback.
//!
//! There is no timeout and no cancellation: a hung peripheral hangs the
//! caller. Callers in time-critical contexts must be designed to absorb
//! that latency, and access to the singleton bus must be serialized by the
//! caller when multiple logical clients exist.

use tracing::debug;

/// Clock polarity and phase. The peripheral-facing convention is mode 0,
/// MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    pub clock_idle_high: bool,
    pub sample_on_trailing_edge: bool,
    /// Bus clock as a divider of the core clock.
    pub clock_divider: u8,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            clock_idle_high: false,
            sample_on_trailing_edge: false,
            clock_divider: 4,
        }
    }
}

/// One byte-wide shift unit. `start_exchange` latches a byte into the
/// shifter; `exchange_done` goes true once all eight clocks have run;
/// `read_byte` returns the byte clocked in during the same exchange.
pub trait BusLink {
    fn configure(&mut self, settings: &BusSettings);
    fn start_exchange(&mut self, byte: u8);
    fn exchange_done(&self) -> bool;
    fn read_byte(&self) -> u8;
}

/// Controller-role driver for the bus. Exclusive, single-threaded access
/// is assumed; at most one exchange is in flight at a time.
pub struct SyncBus<L: BusLink> {
    link: L,
    settings: BusSettings,
    initialized: bool,
}

impl<L: BusLink> SyncBus<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            settings: BusSettings::default(),
            initialized: false,
        }
    }

    pub fn with_settings(link: L, settings: BusSettings) -> Self {
        Self {
            link,
            settings,
            initialized: false,
        }
    }

    /// Configure controller role, clock polarity/phase, and clock rate.
    /// Idempotent; hardware presence is not verified, so there is nothing
    /// to report.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.link.configure(&self.settings);
        self.initialized = true;
        debug!(divider = self.settings.clock_divider, "bus configured");
    }

    /// Shift one byte out while shifting one in, busy-waiting until the
    /// exchange completes.
    fn shift(&mut self, byte: u8) -> u8 {
        self.link.start_exchange(byte);
        while !self.link.exchange_done() {
            std::hint::spin_loop();
        }
        self.link.read_byte()
    }

    /// Full-duplex transfer: each output byte is exchanged for a response
    /// byte, in order, one completed exchange at a time. An empty slice is
    /// a no-op returning an empty buffer.
    pub fn transfer(&mut self, out: &[u8]) -> Vec<u8> {
        let mut received = Vec::with_capacity(out.len());
        for &byte in out {
            received.push(self.shift(byte));
        }
        received
    }

    /// Write-only transmit; the bytes clocked back in are discarded.
    pub fn transmit(&mut self, out: &[u8]) {
        for &byte in out {
            self.shift(byte);
        }
    }

    /// Single-byte exchange without the buffer handling of [`transfer`].
    /// Observably equivalent to `transfer(&[byte])[0]`.
    ///
    /// [`transfer`]: SyncBus::transfer
    pub fn fast_shift(&mut self, byte: u8) -> u8 {
        self.shift(byte)
    }
}
