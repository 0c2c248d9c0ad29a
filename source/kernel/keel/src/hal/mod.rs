// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hardware abstraction layer traits.
//!
//! Each trait is the capability one boot step consumes. The target backend
//! lives in `gd32w51x`; tests provide recording mocks.

use bitflags::bitflags;

pub mod wait;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod gd32w51x;

/// Bus frequencies produced by the clock tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClockFreqs {
    pub core_hz: u32,
    pub ahb_hz: u32,
    pub apb1_hz: u32,
    pub apb2_hz: u32,
}

impl ClockFreqs {
    /// All buses running undivided from a single source.
    pub const fn uniform(hz: u32) -> Self {
        Self { core_hz: hz, ahb_hz: hz, apb1_hz: hz, apb2_hz: hz }
    }
}

/// System clock tree.
pub trait ClockTree {
    /// Selects the system clock source and prescalers and reports the result.
    fn configure(&mut self) -> ClockFreqs;
}

/// Periodic tick timer (SysTick on Cortex-M).
pub trait TickTimer {
    /// Largest reload value the counter accepts.
    const MAX_RELOAD: u32;

    /// Sets the exception priority of the tick interrupt.
    fn set_priority(&mut self, priority: u8);

    /// Loads `reload`, clears the counter and starts it with the interrupt enabled.
    fn start(&mut self, reload: u32);
}

bitflags! {
    /// USART status flags polled by the console.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Status: u32 {
        /// Receive buffer not empty.
        const RBNE = 1 << 5;
        /// Transmission complete.
        const TC = 1 << 6;
        /// Transmit buffer empty.
        const TBE = 1 << 7;
    }
}

bitflags! {
    /// USART directions to enable.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Direction: u8 {
        const TX = 1 << 0;
        const RX = 1 << 1;
    }
}

/// Frame layout as the USART sees it (data plus parity bit).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameBits {
    Eight,
    Nine,
}

/// Parity generation mode programmed into the USART.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParityMode {
    Disabled,
    Even,
    Odd,
}

/// Stop-bit field encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopField {
    One,
    Half,
    Two,
    OneAndHalf,
}

/// Validated line parameters ready to be written to USART registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineSettings {
    /// Value for the baud-rate register (16x oversampling).
    pub divisor: u32,
    pub frame: FrameBits,
    pub parity: ParityMode,
    pub stop: StopField,
}

/// Console USART plus the GPIO and clock-gate plumbing it depends on.
pub trait Usart {
    /// Enables the peripheral clocks of the USART and both pin ports.
    fn enable_clocks(&mut self);
    /// Binds the TX/RX pins to the USART alternate function.
    fn route_pins(&mut self);
    /// Disables the USART and programs the line parameters.
    fn set_line(&mut self, settings: &LineSettings);
    /// Enables the requested directions and the USART itself.
    fn enable(&mut self, direction: Direction);
    fn status(&self) -> Status;
    fn write_data(&mut self, byte: u8);
    fn read_data(&mut self) -> u8;
}

/// Minimal MMIO accessor.
pub trait Mmio {
    /// Writes a 32-bit value to the device.
    ///
    /// # Safety
    ///
    /// `offset` must address a register of the device block.
    unsafe fn write32(&self, offset: usize, value: u32);
    /// Reads a 32-bit value from the device.
    ///
    /// # Safety
    ///
    /// `offset` must address a register of the device block.
    unsafe fn read32(&self, offset: usize) -> u32;

    /// Read-modify-write helper: clears `clear`, then sets `set`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Mmio::write32`].
    unsafe fn modify32(&self, offset: usize, clear: u32, set: u32) {
        let value = self.read32(offset);
        self.write32(offset, (value & !clear) | set);
    }
}
