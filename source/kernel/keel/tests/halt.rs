//! CONTEXT: Tests for bring-up halting on unsatisfiable board parameters
//! OWNERS: @port-boot-team
//! STATUS: Functional
//! TEST_COVERAGE: 2 integration tests
//!
//! TEST_SCENARIOS:
//!   - unreachable_tick_halts(): core clock too slow for the tick rate
//!   - unreachable_baud_halts(): console line rejected by the peripheral clock
//!
//! DEPENDENCIES:
//!   - tests/common: MockClock, MockTick, MockUsart

mod common;

use common::{EventLog, MockClock, MockTick, MockUsart};
use keel::config::{BoardConfig, GD32W515_START, IRC16M_HZ};
use keel::{Board, Spin, StackTop, TickCounter};

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
#[should_panic(expected = "halt: tick")]
fn unreachable_tick_halts() {
    let log = EventLog::default();
    // A 1 kHz core clock leaves a one-cycle tick period.
    let _ = keel::bring_up(StackTop::capture(), board(&log, 1_000), Spin, leaked_ticks(), &GD32W515_START);
}

#[test]
#[should_panic(expected = "halt: console")]
fn unreachable_baud_halts() {
    let log = EventLog::default();
    let config = BoardConfig {
        console: keel::LineConfig { baud: 4_000_000, ..GD32W515_START.console },
        ..GD32W515_START
    };
    let _ = keel::bring_up(StackTop::capture(), board(&log, IRC16M_HZ), Spin, leaked_ticks(), &config);
}
