// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Reset-to-runtime hand-off
//! OWNERS: @port-boot-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: tests/boot_sequence.rs (host mocks record the step order)
//! PUBLIC API: boot(), bring_up(), idle(), Board
//! DEPENDS_ON: hal::{ClockTree, TickTimer, Usart}, time::configure_tick, serial::Serial
//! INVARIANTS: StackTop captured before entry; clock -> tick -> serial -> heap -> runtime;
//!             never returns to the reset vector

use spin::Once;

use crate::config::BoardConfig;
use crate::gc::{HeapRegion, StackBounds, StackTop};
use crate::hal::{wait::Wait, ClockTree, TickTimer, Usart};
use crate::platform::{Platform, Runtime};
use crate::serial::Serial;
use crate::time::{self, TickCounter};

/// Hardware handed to the boot sequence.
pub struct Board<C, T, U> {
    pub clocks: C,
    pub tick: T,
    pub usart: U,
}

/// Configures clock tree, tick and console, in that order.
///
/// Any failure halts inside the failing step.
pub fn bring_up<C, T, U, W>(
    top: StackTop,
    board: Board<C, T, U>,
    wait: W,
    ticks: &'static TickCounter,
    config: &BoardConfig,
) -> Platform<U, W>
where
    C: ClockTree,
    T: TickTimer,
    U: Usart,
    W: Wait + Clone,
{
    let Board { clocks: mut clock_tree, tick: mut timer, usart } = board;

    let clocks = clock_tree.configure();

    time::configure_tick(&mut timer, &clocks, config.tick_hz, config.tick_priority);

    let mut console = Serial::new(usart, wait.clone());
    if let Err(err) = console.configure(&config.console, clocks.apb1_hz) {
        crate::fatal::halt(format_args!("console: {}", err));
    }

    Platform::new(clocks, ticks, console, StackBounds::new(top), wait)
}

/// The reset entry point's body. Never returns.
///
/// `top` must be the stack pointer captured before anything else ran, which
/// is why it is a parameter rather than read here.
#[allow(clippy::too_many_arguments)]
pub fn boot<C, T, U, W, R>(
    top: StackTop,
    board: Board<C, T, U>,
    wait: W,
    ticks: &'static TickCounter,
    config: &BoardConfig,
    heap: HeapRegion,
    slot: &'static Once<Platform<U, W>>,
    runtime: &mut R,
) -> !
where
    C: ClockTree,
    T: TickTimer,
    U: Usart + Send + 'static,
    W: Wait + Clone + Send + Sync + 'static,
    R: Runtime,
{
    let platform: &'static Platform<U, W> =
        slot.call_once(|| bring_up(top, board, wait, ticks, config));
    crate::log::install(platform);

    if cfg!(feature = "boot_banner") {
        log_info!(
            target: "boot",
            "{} with {} ({}) at {} Hz, stack top {:#x}",
            crate::config::BOARD_NAME,
            crate::config::MCU_NAME,
            crate::config::PLATFORM,
            platform.clocks().core_hz,
            top.addr()
        );
    }

    log_debug!(target: "boot", "heap {:?}", heap);
    runtime.register_heap(heap);

    runtime.run(platform);

    log_warn!(target: "boot", "runtime returned; idling");
    idle()
}

/// Parks the core forever.
pub fn idle() -> ! {
    loop {
        crate::arch::cortex_m::wait_for_interrupt();
    }
}
