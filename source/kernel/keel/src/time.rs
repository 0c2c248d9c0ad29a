// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: 1 kHz tick source, millisecond uptime and busy-wait delay
//! OWNERS: @port-team
//! STATUS: Functional
//! PUBLIC API: TICKS, TickCounter::{on_tick, delay_ms, ticks_ms}, configure_tick(), reload_for()
//! DEPENDS_ON: hal::TickTimer, hal::wait::Wait, fatal::halt
//! INVARIANTS: Only the tick interrupt decrements the countdown; only one foreground
//!             caller sets it; the interrupt path never blocks

use core::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use crate::hal::{wait::Wait, ClockFreqs, TickTimer};

/// The counter driven by the SysTick exception.
pub static TICKS: TickCounter = TickCounter::new();

/// Shared state between the tick interrupt and the foreground context.
pub struct TickCounter {
    countdown: AtomicU32,
    uptime_ms: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self { countdown: AtomicU32::new(0), uptime_ms: AtomicU32::new(0) }
    }

    /// Interrupt handler body: one tick elapsed.
    ///
    /// The countdown is decremented with a compare-and-swap so a concurrent
    /// foreground store is never overwritten with a stale value.
    #[inline]
    pub fn on_tick(&self) {
        let _ = self
            .countdown
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1));
        self.uptime_ms.fetch_add(1, Ordering::Relaxed);
    }

    /// Milliseconds since the tick was started. Wraps after ~49.7 days.
    #[inline]
    pub fn ticks_ms(&self) -> u32 {
        self.uptime_ms.load(Ordering::Relaxed)
    }

    /// Ticks still to elapse before the current delay completes.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.countdown.load(Ordering::Acquire)
    }

    /// Blocks until `count` ticks have been observed.
    ///
    /// # Concurrency
    ///
    /// Only one foreground caller may be inside a delay at a time; a second
    /// caller would overwrite the countdown. The tick must already be running,
    /// otherwise [`Spin`](crate::Spin) waits forever.
    pub fn delay_ms<W: Wait>(&self, count: u32, wait: &mut W) -> Result<(), W::Error> {
        self.countdown.store(count, Ordering::Release);
        wait.wait_until(|| self.remaining() == 0)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum TickError {
    #[error("tick rate must be non-zero")]
    ZeroRate,
    #[error("{rate_hz} Hz tick unreachable from a {core_hz} Hz core clock")]
    Unachievable { core_hz: u32, rate_hz: u32 },
}

/// Computes the SysTick reload value for `rate_hz` interrupts per second.
pub fn reload_for(core_hz: u32, rate_hz: u32, max_reload: u32) -> Result<u32, TickError> {
    if rate_hz == 0 {
        return Err(TickError::ZeroRate);
    }
    let period = core_hz / rate_hz;
    if period < 2 || period - 1 > max_reload {
        return Err(TickError::Unachievable { core_hz, rate_hz });
    }
    Ok(period - 1)
}

/// Arms the tick timer at `rate_hz` with the given priority.
///
/// An unreachable interval halts: nothing downstream works without timing.
pub fn configure_tick<T: TickTimer>(timer: &mut T, clocks: &ClockFreqs, rate_hz: u32, priority: u8) {
    let reload = match reload_for(clocks.core_hz, rate_hz, T::MAX_RELOAD) {
        Ok(reload) => reload,
        Err(err) => crate::fatal::halt(format_args!("tick: {}", err)),
    };
    timer.set_priority(priority);
    timer.start(reload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::wait::Spin;

    const SYSTICK_MAX: u32 = 0x00ff_ffff;

    #[test]
    fn one_khz_from_irc16m() {
        assert_eq!(reload_for(16_000_000, 1_000, SYSTICK_MAX), Ok(15_999));
    }

    #[test]
    fn oversized_period_is_rejected() {
        assert_eq!(
            reload_for(180_000_000, 1, SYSTICK_MAX),
            Err(TickError::Unachievable { core_hz: 180_000_000, rate_hz: 1 })
        );
        assert_eq!(reload_for(16_000_000, 0, SYSTICK_MAX), Err(TickError::ZeroRate));
    }

    #[test]
    fn tick_saturates_at_zero() {
        let ticks = TickCounter::new();
        ticks.on_tick();
        ticks.on_tick();
        assert_eq!(ticks.remaining(), 0);
        assert_eq!(ticks.ticks_ms(), 2);
    }

    #[test]
    fn zero_delay_returns_immediately() {
        let ticks = TickCounter::new();
        ticks.delay_ms(0, &mut Spin).unwrap();
        assert_eq!(ticks.ticks_ms(), 0);
    }

    #[test]
    fn uptime_wraps() {
        let ticks = TickCounter::new();
        ticks.uptime_ms.store(u32::MAX, Ordering::Relaxed);
        ticks.on_tick();
        assert_eq!(ticks.ticks_ms(), 0);
    }
}
