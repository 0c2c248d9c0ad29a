// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Panic handler emitting diagnostics over the console UART
//! OWNERS: @port-team
//! PUBLIC API: panic handler (no_std)
//! DEPENDS_ON: hal::gd32w51x::RawConsole, boot::idle
//! INVARIANTS: Never takes the console mutex; no allocations; halts afterwards

use core::{fmt::Write, panic::PanicInfo};

use crate::hal::gd32w51x::RawConsole;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let mut w = RawConsole;
    let _ = w.write_str("\nPANIC: ");
    if let Some(location) = info.location() {
        let _ = write!(w, "{}:{}: ", location.file(), location.line());
    }
    let _ = writeln!(w, "{}", info.message());
    crate::boot::idle()
}
