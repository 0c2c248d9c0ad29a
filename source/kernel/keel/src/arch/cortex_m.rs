// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cortex-M helpers used by the boot path and the root scan.
//!
//! Host builds get stand-ins so the higher level logic can still run under
//! `cargo test`: the stack pointer is approximated by the address of a local
//! in the caller's frame and WFI becomes a spin hint.

/// Reads the current stack pointer.
///
/// Always inlined so the value belongs to the caller's frame.
#[inline(always)]
pub fn read_sp() -> usize {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    {
        cortex_m::register::msp::read() as usize
    }
    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    {
        let marker = 0u8;
        core::hint::black_box(core::ptr::addr_of!(marker)) as usize
    }
}

/// Number of callee-saved general purpose registers (r4-r11).
pub const CALLEE_SAVED: usize = 8;

/// Stores r4-r11 into `slots` so their contents live in memory.
#[inline(always)]
pub fn spill_callee_saved(slots: &mut [usize; CALLEE_SAVED]) {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    unsafe {
        core::arch::asm!(
            "stm r0, {{r4, r5, r6, r7, r8, r9, r10, r11}}",
            in("r0") slots.as_mut_ptr(),
            options(nostack, preserves_flags),
        );
    }
    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    {
        core::hint::black_box(slots);
    }
}

/// Issues a WFI instruction or yields on the host.
#[inline]
pub fn wait_for_interrupt() {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    cortex_m::asm::wfi();
    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    core::hint::spin_loop();
}
