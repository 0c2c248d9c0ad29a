// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Blocking console transport over the board UART
//! OWNERS: @port-team
//! STATUS: Functional
//! PUBLIC API: Serial::{configure, write_byte, write_bytes_cooked, write_bytes, write_cstr, read_byte}
//! DEPENDS_ON: hal::Usart, hal::wait::Wait
//! INVARIANTS: Output is cooked (`\n` -> `\r\n`) and never buffered or reordered; input is raw;
//!             the line is reprogrammed only after the transmitter has drained

use core::ffi::CStr;
use core::fmt;

use thiserror::Error;

use crate::hal::{
    wait::Wait, Direction, FrameBits, LineSettings, ParityMode, Status, StopField, Usart,
};

/// Number of data bits per character.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordLength {
    Seven,
    Eight,
    Nine,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopBits {
    One,
    Half,
    Two,
    OneAndHalf,
}

/// Line parameters as a user states them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineConfig {
    pub baud: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SerialError<E: fmt::Debug> {
    #[error("baud rate {baud} unreachable from a {pclk_hz} Hz peripheral clock")]
    Baud { baud: u32, pclk_hz: u32 },
    #[error("{word_length:?} data bits with {parity:?} parity is not a supported frame")]
    Frame { word_length: WordLength, parity: Parity },
    #[error("line wait abandoned: {0:?}")]
    Wait(E),
}

impl LineSettings {
    /// Validates `line` against the peripheral clock and encodes it.
    pub fn new<E: fmt::Debug>(line: &LineConfig, pclk_hz: u32) -> Result<Self, SerialError<E>> {
        let divisor = baud_divisor(pclk_hz, line.baud)
            .ok_or(SerialError::Baud { baud: line.baud, pclk_hz })?;
        let frame = match (line.word_length, line.parity) {
            (WordLength::Eight, Parity::None) | (WordLength::Seven, Parity::Even | Parity::Odd) => {
                FrameBits::Eight
            }
            (WordLength::Nine, Parity::None) | (WordLength::Eight, Parity::Even | Parity::Odd) => {
                FrameBits::Nine
            }
            (word_length, parity) => return Err(SerialError::Frame { word_length, parity }),
        };
        let parity = match line.parity {
            Parity::None => ParityMode::Disabled,
            Parity::Even => ParityMode::Even,
            Parity::Odd => ParityMode::Odd,
        };
        let stop = match line.stop_bits {
            StopBits::One => StopField::One,
            StopBits::Half => StopField::Half,
            StopBits::Two => StopField::Two,
            StopBits::OneAndHalf => StopField::OneAndHalf,
        };
        Ok(Self { divisor, frame, parity, stop })
    }
}

/// Baud register value for 16x oversampling, rounded to nearest.
///
/// `None` when the divisor falls outside the 12.4 fixed-point register range.
pub fn baud_divisor(pclk_hz: u32, baud: u32) -> Option<u32> {
    if baud == 0 {
        return None;
    }
    let divisor = (u64::from(pclk_hz) + u64::from(baud) / 2) / u64::from(baud);
    if (16..=0xffff).contains(&divisor) {
        Some(divisor as u32)
    } else {
        None
    }
}

/// Console transport. Owns the USART exclusively.
pub struct Serial<U, W> {
    usart: U,
    wait: W,
    active: Option<LineSettings>,
}

impl<U: Usart, W: Wait> Serial<U, W> {
    pub const fn new(usart: U, wait: W) -> Self {
        Self { usart, wait, active: None }
    }

    /// Line settings currently programmed, if any.
    pub fn settings(&self) -> Option<&LineSettings> {
        self.active.as_ref()
    }

    /// Brings the UART up with `line`.
    ///
    /// Clocks and pins are set up on the first call only. Repeating the call
    /// with identical parameters does nothing; a different line is applied
    /// only after the transmitter reports completion, so a byte in flight is
    /// never cut short.
    pub fn configure(&mut self, line: &LineConfig, pclk_hz: u32) -> Result<(), SerialError<W::Error>> {
        let settings = LineSettings::new(line, pclk_hz)?;
        match self.active {
            Some(active) if active == settings => return Ok(()),
            Some(_) => {
                let usart = &self.usart;
                self.wait
                    .wait_until(|| usart.status().contains(Status::TC))
                    .map_err(SerialError::Wait)?;
            }
            None => {
                self.usart.enable_clocks();
                self.usart.route_pins();
            }
        }
        self.usart.set_line(&settings);
        self.usart.enable(Direction::TX | Direction::RX);
        self.active = Some(settings);
        Ok(())
    }

    /// Waits for room in the transmit register, then sends one byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        debug_assert!(self.active.is_some(), "console used before configure");
        let usart = &self.usart;
        self.wait.wait_until(|| usart.status().contains(Status::TBE))?;
        self.usart.write_data(byte);
        Ok(())
    }

    /// Sends `buf`, emitting `\r` before every `\n`.
    pub fn write_bytes_cooked(&mut self, buf: &[u8]) -> Result<(), W::Error> {
        for &byte in buf {
            if byte == b'\n' {
                self.write_byte(b'\r')?;
            }
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// The runtime's plain stdout hook. The console always cooks its output.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), W::Error> {
        self.write_bytes_cooked(buf)
    }

    /// Sends a zero-terminated string through the cooked writer.
    pub fn write_cstr(&mut self, s: &CStr) -> Result<(), W::Error> {
        self.write_bytes_cooked(s.to_bytes())
    }

    /// Waits for a received byte and returns it. No echo, no line editing.
    pub fn read_byte(&mut self) -> Result<u8, W::Error> {
        debug_assert!(self.active.is_some(), "console used before configure");
        let usart = &self.usart;
        self.wait.wait_until(|| usart.status().contains(Status::RBNE))?;
        Ok(self.usart.read_data())
    }

    /// Gives the USART back, e.g. to inspect a mock.
    pub fn release(self) -> U {
        self.usart
    }
}

impl<U: Usart, W: Wait> fmt::Write for Serial<U, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes_cooked(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
