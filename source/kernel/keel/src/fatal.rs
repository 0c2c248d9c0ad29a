// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fatal configuration errors.
//!
//! There is no supervisor to report to: on the target the reason is logged
//! (if a console exists) and the core idles forever. Host builds panic with
//! the reason instead so tests can observe the halt.

use core::fmt::Arguments;

/// Stops the system after an unrecoverable error.
#[cold]
pub fn halt(reason: Arguments<'_>) -> ! {
    log_error!(target: "fatal", "{}", reason);
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    {
        crate::boot::idle()
    }
    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    {
        panic!("halt: {}", reason)
    }
}
