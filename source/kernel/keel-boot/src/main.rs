// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reset entry for the GD32W515T-START. Captures the stack top, then hands
//! the board to `keel::boot`, which brings the hardware up and runs the
//! MicroPython core linked into the image.
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use cortex_m_rt::{entry, exception};
    use keel::config::{GD32W515_START, HEAP_SIZE};
    use keel::ffi::{MicroPython, PLATFORM};
    use keel::hal::gd32w51x::{Irc16m, SysTick as SysTickTimer, Usart1};
    use keel::{Board, HeapArena, Spin, StackTop, TICKS};

    static HEAP: HeapArena<HEAP_SIZE> = HeapArena::new();

    #[entry]
    fn main() -> ! {
        let top = StackTop::capture();

        let Some(core) = cortex_m::Peripherals::take() else {
            keel::idle()
        };
        let Some(heap) = HEAP.take() else {
            keel::idle()
        };
        let board = Board {
            clocks: Irc16m::new(),
            tick: SysTickTimer::new(core.SYST, core.SCB),
            usart: Usart1::new(GD32W515_START.console_tx, GD32W515_START.console_rx),
        };
        keel::boot(top, board, Spin, &TICKS, &GD32W515_START, heap, &PLATFORM, &mut MicroPython)
    }

    #[exception]
    fn SysTick() {
        TICKS.on_tick();
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("keel-boot runs on the GD32W515 only; build with --target thumbv8m.main-none-eabihf");
}
