// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Process-wide platform context handed to the runtime
//! OWNERS: @port-team
//! PUBLIC API: Platform, Runtime
//! DEPENDS_ON: time::TickCounter, serial::Serial, gc::StackBounds, log::Sink
//! INVARIANTS: Created once by the boot sequence; the console is reachable only through
//!             its mutex; the tick counter is shared with the tick interrupt by reference

use core::fmt::Arguments;

use spin::{Mutex, MutexGuard};

use crate::gc::{Collector, RootScanError, StackBounds};
use crate::hal::{wait::Wait, ClockFreqs, Usart};
use crate::log::{self, Level, Sink};
use crate::serial::Serial;
use crate::time::TickCounter;

/// Everything the runtime may call into after boot.
pub struct Platform<U, W> {
    clocks: ClockFreqs,
    ticks: &'static TickCounter,
    console: Mutex<Serial<U, W>>,
    stack: StackBounds,
    wait: W,
}

impl<U: Usart, W: Wait + Clone> Platform<U, W> {
    pub fn new(
        clocks: ClockFreqs,
        ticks: &'static TickCounter,
        console: Serial<U, W>,
        stack: StackBounds,
        wait: W,
    ) -> Self {
        Self { clocks, ticks, console: Mutex::new(console), stack, wait }
    }

    pub fn clocks(&self) -> &ClockFreqs {
        &self.clocks
    }

    /// Exclusive access to the console.
    pub fn console(&self) -> MutexGuard<'_, Serial<U, W>> {
        self.console.lock()
    }

    /// Blocks for `ms` milliseconds. Single foreground caller only.
    pub fn delay_ms(&self, ms: u32) -> Result<(), W::Error> {
        self.ticks.delay_ms(ms, &mut self.wait.clone())
    }

    pub fn ticks_ms(&self) -> u32 {
        self.ticks.ticks_ms()
    }

    /// Reports the live stack to `collector`.
    pub fn collect_roots<C: Collector + ?Sized>(&self, collector: &mut C) -> Result<(), RootScanError> {
        self.stack.collect_roots(collector)
    }
}

impl<U, W> Sink for Platform<U, W>
where
    U: Usart + Send,
    W: Wait + Clone + Send + Sync,
{
    fn write_line(&self, level: Level, target: &'static str, args: Arguments<'_>) {
        // A holder of the console (or a panic inside it) drops the line rather than deadlocking.
        if let Some(mut console) = self.console.try_lock() {
            let _ = log::frame(&mut *console, level, target, args);
        }
    }
}

/// The managed-language runtime: its collector plus its entry point.
pub trait Runtime: Collector {
    /// Application entry point. Not expected to return.
    fn run<U, W>(&mut self, platform: &'static Platform<U, W>)
    where
        U: Usart,
        W: Wait + Clone;
}
