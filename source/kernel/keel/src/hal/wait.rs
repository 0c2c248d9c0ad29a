// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Blocking wait capability shared by the delay and the console
//! OWNERS: @port-team
//! PUBLIC API: Wait, Spin, Bounded, WaitError
//! INVARIANTS: A wait never yields to other work; it returns only once the
//!             condition holds or the policy gives up

use core::convert::Infallible;

use thiserror::Error;

/// Policy deciding how long a hardware condition is polled.
///
/// Every busy loop in the port goes through this trait so a bounded variant
/// can replace the default without touching the callers.
pub trait Wait {
    /// Reported when the policy gives up. [`Infallible`] for policies that never do.
    type Error: core::fmt::Debug;

    /// Polls `ready` until it returns `true`.
    fn wait_until<F: FnMut() -> bool>(&mut self, ready: F) -> Result<(), Self::Error>;
}

/// Spins forever. A stalled condition hangs the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spin;

impl Wait for Spin {
    type Error = Infallible;

    #[inline]
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) -> Result<(), Infallible> {
        while !ready() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    #[error("condition not met after {polls} polls")]
    TimedOut { polls: u32 },
}

/// Gives up after a fixed number of polls.
#[derive(Clone, Copy, Debug)]
pub struct Bounded {
    polls: u32,
}

impl Bounded {
    pub const fn new(polls: u32) -> Self {
        Self { polls }
    }
}

impl Wait for Bounded {
    type Error = WaitError;

    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) -> Result<(), WaitError> {
        for _ in 0..self.polls {
            if ready() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        if ready() {
            Ok(())
        } else {
            Err(WaitError::TimedOut { polls: self.polls })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_returns_once_condition_holds() {
        let mut polls = 0;
        Spin.wait_until(|| {
            polls += 1;
            polls == 3
        })
        .unwrap();
        assert_eq!(polls, 3);
    }

    #[test]
    fn bounded_reports_timeout() {
        let mut wait = Bounded::new(4);
        assert_eq!(wait.wait_until(|| false), Err(WaitError::TimedOut { polls: 4 }));
    }

    #[test]
    fn bounded_accepts_late_success() {
        let mut polls = 0;
        let mut wait = Bounded::new(2);
        wait.wait_until(|| {
            polls += 1;
            polls == 3
        })
        .unwrap();
    }
}
