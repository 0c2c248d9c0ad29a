// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! HAL implementation targeting the GD32W51x (Cortex-M33).
//!
//! Only the registers the bring-up touches are described: RCU clock gates and
//! system clock switch, GPIO mode/alternate-function muxing, USART1 and the
//! core SysTick.

use core::fmt;
use core::ptr::{read_volatile, write_volatile};

use cortex_m::peripheral::{scb::SystemHandler, syst::SystClkSource, SCB, SYST};

use super::{
    ClockFreqs, ClockTree, Direction, FrameBits, LineSettings, Mmio, ParityMode, Status,
    StopField, TickTimer, Usart,
};
use crate::config::{PinConfig, Port, IRC16M_HZ};

const RCU_BASE: usize = 0x4002_3800;
const GPIOA_BASE: usize = 0x4002_0000;
const GPIOB_BASE: usize = 0x4002_0400;
const GPIOC_BASE: usize = 0x4002_0800;
const USART1_BASE: usize = 0x4000_4400;

mod rcu {
    pub const CTL: usize = 0x00;
    pub const CFG0: usize = 0x08;
    pub const AHB1EN: usize = 0x30;
    pub const APB1EN: usize = 0x40;

    pub const CTL_IRC16MEN: u32 = 1 << 0;
    pub const CTL_IRC16MSTB: u32 = 1 << 1;
    /// SCS, AHBPSC, APB1PSC, APB2PSC.
    pub const CFG0_SWITCH_MASK: u32 = 0b11 | (0xf << 4) | (0b111 << 10) | (0b111 << 13);
    pub const CFG0_SCSS_MASK: u32 = 0b11 << 2;
    pub const APB1EN_USART1EN: u32 = 1 << 17;
}

mod gpio {
    pub const CTL: usize = 0x00;
    pub const OMODE: usize = 0x04;
    pub const OSPD: usize = 0x08;
    pub const PUD: usize = 0x0c;
    pub const AFSEL0: usize = 0x20;
    pub const AFSEL1: usize = 0x24;

    pub const MODE_AF: u32 = 0b10;
    pub const PUD_PULLUP: u32 = 0b01;
    pub const OSPD_2MHZ: u32 = 0b00;
}

mod usart {
    pub const CTL0: usize = 0x00;
    pub const CTL1: usize = 0x04;
    pub const BAUD: usize = 0x0c;
    pub const STAT: usize = 0x1c;
    pub const RDATA: usize = 0x24;
    pub const TDATA: usize = 0x28;

    pub const CTL0_UEN: u32 = 1 << 0;
    pub const CTL0_REN: u32 = 1 << 2;
    pub const CTL0_TEN: u32 = 1 << 3;
    pub const CTL0_PM: u32 = 1 << 9;
    pub const CTL0_PCEN: u32 = 1 << 10;
    pub const CTL0_WL: u32 = 1 << 12;
    pub const CTL0_OVSMOD: u32 = 1 << 15;
    pub const CTL1_STB_SHIFT: u32 = 12;
    pub const CTL1_STB_MASK: u32 = 0b11 << CTL1_STB_SHIFT;
}

/// A peripheral register block.
#[derive(Clone, Copy, Debug)]
pub struct Block(usize);

impl Mmio for Block {
    unsafe fn write32(&self, offset: usize, value: u32) {
        write_volatile((self.0 + offset) as *mut u32, value);
    }

    unsafe fn read32(&self, offset: usize) -> u32 {
        read_volatile((self.0 + offset) as *const u32)
    }
}

const fn port_block(port: Port) -> Block {
    match port {
        Port::A => Block(GPIOA_BASE),
        Port::B => Block(GPIOB_BASE),
        Port::C => Block(GPIOC_BASE),
    }
}

const fn port_clock_bit(port: Port) -> u32 {
    match port {
        Port::A => 1 << 0,
        Port::B => 1 << 1,
        Port::C => 1 << 2,
    }
}

/// System clock running from the internal 16 MHz RC oscillator, all buses /1.
pub struct Irc16m {
    rcu: Block,
}

impl Irc16m {
    pub const fn new() -> Self {
        Self { rcu: Block(RCU_BASE) }
    }
}

impl ClockTree for Irc16m {
    fn configure(&mut self) -> ClockFreqs {
        // SAFETY: RCU registers; only the boot path touches them.
        unsafe {
            self.rcu.modify32(rcu::CTL, 0, rcu::CTL_IRC16MEN);
            while self.rcu.read32(rcu::CTL) & rcu::CTL_IRC16MSTB == 0 {}
            // SCS = IRC16M, every prescaler = /1.
            self.rcu.modify32(rcu::CFG0, rcu::CFG0_SWITCH_MASK, 0);
            while self.rcu.read32(rcu::CFG0) & rcu::CFG0_SCSS_MASK != 0 {}
        }
        ClockFreqs::uniform(IRC16M_HZ)
    }
}

/// The core SysTick timer.
pub struct SysTick {
    syst: SYST,
    scb: SCB,
}

impl SysTick {
    pub fn new(syst: SYST, scb: SCB) -> Self {
        Self { syst, scb }
    }
}

impl TickTimer for SysTick {
    const MAX_RELOAD: u32 = 0x00ff_ffff;

    fn set_priority(&mut self, priority: u8) {
        // SAFETY: the tick is the only prioritised exception; no priority-based
        // critical section depends on its level.
        unsafe { self.scb.set_priority(SystemHandler::SysTick, priority) };
    }

    fn start(&mut self, reload: u32) {
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }
}

/// USART1 with its TX/RX pins.
pub struct Usart1 {
    rcu: Block,
    regs: Block,
    tx: PinConfig,
    rx: PinConfig,
}

impl Usart1 {
    pub const fn new(tx: PinConfig, rx: PinConfig) -> Self {
        Self { rcu: Block(RCU_BASE), regs: Block(USART1_BASE), tx, rx }
    }

    fn route(pin: &PinConfig) {
        let port = port_block(pin.port);
        let n = pin.pin as u32;
        let two_bit = 0b11 << (n * 2);
        let (afsel, shift) = if n < 8 { (gpio::AFSEL0, n * 4) } else { (gpio::AFSEL1, (n - 8) * 4) };
        // SAFETY: GPIO registers of a port whose clock is enabled.
        unsafe {
            port.modify32(afsel, 0xf << shift, (pin.af as u32 & 0xf) << shift);
            port.modify32(gpio::CTL, two_bit, gpio::MODE_AF << (n * 2));
            port.modify32(gpio::PUD, two_bit, gpio::PUD_PULLUP << (n * 2));
            port.modify32(gpio::OMODE, 1 << n, 0);
            port.modify32(gpio::OSPD, two_bit, gpio::OSPD_2MHZ << (n * 2));
        }
    }
}

impl Usart for Usart1 {
    fn enable_clocks(&mut self) {
        let ports = port_clock_bit(self.tx.port) | port_clock_bit(self.rx.port);
        // SAFETY: RCU enable registers.
        unsafe {
            self.rcu.modify32(rcu::AHB1EN, 0, ports);
            self.rcu.modify32(rcu::APB1EN, 0, rcu::APB1EN_USART1EN);
        }
    }

    fn route_pins(&mut self) {
        Self::route(&self.tx);
        Self::route(&self.rx);
    }

    fn set_line(&mut self, settings: &LineSettings) {
        let mut ctl0 = 0;
        if settings.frame == FrameBits::Nine {
            ctl0 |= usart::CTL0_WL;
        }
        match settings.parity {
            ParityMode::Disabled => {}
            ParityMode::Even => ctl0 |= usart::CTL0_PCEN,
            ParityMode::Odd => ctl0 |= usart::CTL0_PCEN | usart::CTL0_PM,
        }
        let stb: u32 = match settings.stop {
            StopField::One => 0b00,
            StopField::Half => 0b01,
            StopField::Two => 0b10,
            StopField::OneAndHalf => 0b11,
        };
        // SAFETY: USART1 registers; frame fields are writable only while UEN is clear.
        unsafe {
            self.regs.modify32(usart::CTL0, usart::CTL0_UEN, 0);
            self.regs.modify32(
                usart::CTL0,
                usart::CTL0_WL
                    | usart::CTL0_PCEN
                    | usart::CTL0_PM
                    | usart::CTL0_OVSMOD
                    | usart::CTL0_TEN
                    | usart::CTL0_REN,
                ctl0,
            );
            self.regs.modify32(usart::CTL1, usart::CTL1_STB_MASK, stb << usart::CTL1_STB_SHIFT);
            self.regs.write32(usart::BAUD, settings.divisor);
        }
    }

    fn enable(&mut self, direction: Direction) {
        let mut bits = usart::CTL0_UEN;
        if direction.contains(Direction::TX) {
            bits |= usart::CTL0_TEN;
        }
        if direction.contains(Direction::RX) {
            bits |= usart::CTL0_REN;
        }
        // SAFETY: USART1 control register.
        unsafe { self.regs.modify32(usart::CTL0, 0, bits) };
    }

    fn status(&self) -> Status {
        // SAFETY: USART1 status register; reading has no side effects.
        Status::from_bits_truncate(unsafe { self.regs.read32(usart::STAT) })
    }

    fn write_data(&mut self, byte: u8) {
        // SAFETY: USART1 transmit data register.
        unsafe { self.regs.write32(usart::TDATA, u32::from(byte)) };
    }

    fn read_data(&mut self) -> u8 {
        // SAFETY: USART1 receive data register; reading clears RBNE.
        unsafe { self.regs.read32(usart::RDATA) as u8 }
    }
}

/// Raw, lock-free USART1 emission for panic contexts where the console mutex may be held.
pub struct RawConsole;

impl RawConsole {
    fn put(byte: u8) {
        let regs = Block(USART1_BASE);
        // SAFETY: USART1 registers; a panic is terminal so interleaving is harmless.
        unsafe {
            while regs.read32(usart::STAT) & Status::TBE.bits() == 0 {}
            regs.write32(usart::TDATA, u32::from(byte));
        }
    }
}

impl fmt::Write for RawConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            if byte == b'\n' {
                Self::put(b'\r');
            }
            Self::put(byte);
        }
        Ok(())
    }
}
