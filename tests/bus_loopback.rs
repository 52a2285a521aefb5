// Integration tests for the synchronous bus driver against a loopback
// peripheral stub that echoes every shifted byte.

use std::cell::Cell;

use grit_rs::bus::{BusLink, BusSettings, SyncBus};

/// Loopback peripheral: the byte shifted out is the byte shifted in.
/// Completion is modeled with a poll countdown so the driver's busy-wait
/// loop actually spins before each byte completes.
#[derive(Default)]
struct LoopbackLink {
    shifter: Cell<u8>,
    polls_left: Cell<u8>,
    exchanges: Cell<u32>,
}

impl BusLink for LoopbackLink {
    fn configure(&mut self, _settings: &BusSettings) {}

    fn start_exchange(&mut self, byte: u8) {
        self.shifter.set(byte);
        self.polls_left.set(3);
        self.exchanges.set(self.exchanges.get() + 1);
    }

    fn exchange_done(&self) -> bool {
        let left = self.polls_left.get();
        if left == 0 {
            return true;
        }
        self.polls_left.set(left - 1);
        false
    }

    fn read_byte(&self) -> u8 {
        self.shifter.get()
    }
}

#[test]
fn empty_transfer_is_a_noop() {
    let mut bus = SyncBus::new(LoopbackLink::default());
    bus.init();
    assert!(bus.transfer(&[]).is_empty());
}

#[test]
fn transfer_echoes_in_order() {
    let mut bus = SyncBus::new(LoopbackLink::default());
    bus.init();
    assert_eq!(bus.transfer(&[0xAA, 0x55]), vec![0xAA, 0x55]);
}

#[test]
fn fast_shift_equals_single_byte_transfer() {
    let mut bus = SyncBus::new(LoopbackLink::default());
    bus.init();
    for byte in 0..=255u8 {
        let via_fast = bus.fast_shift(byte);
        let via_transfer = bus.transfer(&[byte])[0];
        assert_eq!(via_fast, via_transfer);
        assert_eq!(via_fast, byte);
    }
}

#[test]
fn transmit_discards_received_bytes_without_side_effects() {
    let mut bus = SyncBus::new(LoopbackLink::default());
    bus.init();
    bus.transmit(&[0xDE, 0xAD, 0xBE, 0xEF]);
    // A subsequent independent transfer sees only its own exchange.
    assert_eq!(bus.transfer(&[0x42]), vec![0x42]);
}
