// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: KEEL bring-up layer for running a MicroPython-class runtime on the GD32W515
//! OWNERS: @port-team
//! PUBLIC API: boot(), Platform, TickCounter, Serial, StackTop, HeapArena, NoFilesystem
//! DEPENDS_ON: hal traits (host mocks or gd32w51x registers), spin, bitflags, thiserror
//! INVARIANTS: Stack top captured before boot; tick counter decremented only by the tick
//!             interrupt; console owned by the platform context
//!
//! The crate is `no_std` on the target. Host builds compile every algorithm
//! against the `hal` traits so the boot order, the delay, the cooked console
//! and the root scan can be exercised with mocks.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

#[macro_use]
pub mod log;

pub mod abi;
mod arch;
pub mod boot;
pub mod config;
pub mod fatal;
pub mod gc;
pub mod hal;
pub mod platform;
pub mod serial;
pub mod storage;
pub mod time;

#[cfg(all(feature = "micropython", target_arch = "arm", target_os = "none"))]
pub mod ffi;

#[cfg(all(target_arch = "arm", target_os = "none", not(test)))]
mod panic;

pub use boot::{boot, bring_up, idle, Board};
pub use gc::{Collector, HeapArena, HeapRegion, RootRange, RootScanError, StackBounds, StackTop};
pub use hal::wait::{Bounded, Spin, Wait, WaitError};
pub use platform::{Platform, Runtime};
pub use serial::{LineConfig, Parity, Serial, SerialError, StopBits, WordLength};
pub use storage::{ImportStat, NoFilesystem, StorageError, StorageProvider};
pub use time::{TickCounter, TickError, TICKS};

/// Unwraps a result whose error type can never be constructed.
#[inline]
pub fn infallible<T>(result: Result<T, core::convert::Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
