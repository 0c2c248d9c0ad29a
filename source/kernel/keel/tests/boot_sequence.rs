//! CONTEXT: Tests for the reset-to-runtime hand-off
//! OWNERS: @port-boot-team
//! STATUS: Functional
//! TEST_COVERAGE: 2 integration tests
//!
//! TEST_SCOPE:
//!   - Step order: clock tree, tick, console, heap, runtime entry
//!   - Tick programmed for 1 kHz at the most urgent priority
//!   - Root scan bounded by the captured stack top
//!   - Boot banner is the first console line
//!
//! TEST_SCENARIOS:
//!   - boot_runs_steps_in_order(): full sequence against recording doubles
//!   - bring_up_leaves_console_ready(): console usable right after bring-up
//!
//! DEPENDENCIES:
//!   - tests/common: MockClock, MockTick, MockUsart, EntryRecorder

mod common;

use std::panic::{self, AssertUnwindSafe};

use spin::Once;

use common::{Event, EventLog, MockClock, MockTick, MockUsart, EntryRecorder, ENTRY_REACHED};
use keel::config::{GD32W515_START, HEAP_SIZE, IRC16M_HZ};
use keel::hal::Direction;
use keel::serial::baud_divisor;
use keel::{Board, HeapArena, Platform, Spin, StackTop, TickCounter};

static HEAP: HeapArena<HEAP_SIZE> = HeapArena::new();

fn board(log: &EventLog, core_hz: u32) -> Board<MockClock, MockTick, MockUsart> {
    Board {
        clocks: MockClock { log: log.clone(), core_hz },
        tick: MockTick { log: log.clone() },
        usart: MockUsart::new(log.clone()),
    }
}

fn leaked_ticks() -> &'static TickCounter {
    Box::leak(Box::new(TickCounter::new()))
}

#[test]
fn boot_runs_steps_in_order() {
    let log = EventLog::default();
    let slot: &'static Once<Platform<MockUsart, Spin>> = Box::leak(Box::new(Once::new()));
    let heap = HEAP.take().unwrap();
    let top = StackTop::capture();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        keel::boot(
            top,
            board(&log, IRC16M_HZ),
            Spin,
            leaked_ticks(),
            &GD32W515_START,
            heap,
            slot,
            &mut EntryRecorder { log: log.clone() },
        );
    }));
    let payload = outcome.unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some(ENTRY_REACHED));

    let settings = *slot.get().unwrap().console().settings().unwrap();
    assert_eq!(settings.divisor, baud_divisor(IRC16M_HZ, 115_200).unwrap());

    let banner = b"[INFO boot] GD32W515T-START with GD32W515 (GD32) at 16000000 Hz";
    assert!(log.sent().starts_with(banner), "banner missing: {:?}", String::from_utf8_lossy(&log.sent()));

    let steps = log.steps();
    let (roots, steps) = steps.split_last().unwrap();
    assert_eq!(
        steps,
        &[
            Event::ClockConfigured,
            Event::TickPriority(0),
            Event::TickStarted(15_999),
            Event::UsartClocks,
            Event::UsartPins,
            Event::LineSet(settings),
            Event::UsartEnabled(Direction::TX | Direction::RX),
            Event::HeapRegistered(HEAP_SIZE),
            Event::EntryPoint,
        ]
    );
    match *roots {
        Event::RootsMarked { low, high } => {
            assert_eq!(high, top.addr());
            assert!(low <= high);
        }
        ref other => panic!("expected a root scan, got {:?}", other),
    }
}

#[test]
fn bring_up_leaves_console_ready() {
    let log = EventLog::default();
    let platform = keel::bring_up(
        StackTop::capture(),
        board(&log, IRC16M_HZ),
        Spin,
        leaked_ticks(),
        &GD32W515_START,
    );
    assert_eq!(platform.clocks().core_hz, IRC16M_HZ);

    let before = log.sent().len();
    keel::infallible(platform.console().write_bytes(b"hi\n"));
    assert_eq!(&log.sent()[before..], b"hi\r\n");
}
