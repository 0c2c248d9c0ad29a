// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Compile-time board configuration for the GD32W515T-START
//! OWNERS: @port-team
//! PUBLIC API: BoardConfig, GD32W515_START, HEAP_SIZE, PinConfig, Port
//! INVARIANTS: Values are fixed at build time; nothing here is mutated at run time

use static_assertions::const_assert;

use crate::serial::{LineConfig, Parity, StopBits, WordLength};

pub const BOARD_NAME: &str = "GD32W515T-START";
pub const MCU_NAME: &str = "GD32W515";
/// Platform name reported by the runtime and the boot banner.
pub const PLATFORM: &str = "GD32";

/// Frequency of the internal 16 MHz RC oscillator the port runs from.
pub const IRC16M_HZ: u32 = 16_000_000;

/// Size of the statically reserved garbage-collected heap.
pub const HEAP_SIZE: usize = 8096;

const_assert!(HEAP_SIZE % core::mem::size_of::<usize>() == 0);

/// GPIO port identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Port {
    A,
    B,
    C,
}

/// A pin routed to a peripheral through its alternate-function mux.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PinConfig {
    pub port: Port,
    pub pin: u8,
    pub af: u8,
}

/// Everything the boot sequence needs to know about the board.
#[derive(Clone, Copy, Debug)]
pub struct BoardConfig {
    /// Tick interrupt rate; 1 kHz gives the millisecond time base.
    pub tick_hz: u32,
    /// SysTick exception priority (0 is the most urgent).
    pub tick_priority: u8,
    pub console: LineConfig,
    pub console_tx: PinConfig,
    pub console_rx: PinConfig,
}

pub const GD32W515_START: BoardConfig = BoardConfig {
    tick_hz: 1_000,
    tick_priority: 0,
    console: LineConfig {
        baud: 115_200,
        word_length: WordLength::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    },
    console_tx: PinConfig { port: Port::B, pin: 15, af: 7 },
    console_rx: PinConfig { port: Port::A, pin: 8, af: 3 },
};

const_assert!(GD32W515_START.console_tx.pin < 16);
const_assert!(GD32W515_START.console_rx.pin < 16);
