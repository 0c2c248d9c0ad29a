// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: C-ABI glue between the platform and a MicroPython core
//! OWNERS: @port-team
//! STATUS: Functional
//! PUBLIC API: PLATFORM, MicroPython, exported mp_hal_* / gc_collect / stub symbols
//! DEPENDS_ON: platform::Platform, storage::NoFilesystem, abi, hal::gd32w51x::Usart1
//! INVARIANTS: Hooks run in the single foreground context after boot published PLATFORM;
//!             none of them is called from the tick interrupt
//!
//! The runtime is linked as C objects. It calls back into this module for
//! console I/O, timing, root scanning and the filesystem hooks, and this
//! module calls its `bare_main`, `gc_*` and `mp_raise_OSError` entry points.

use core::ffi::{c_char, c_int, c_void, CStr};

use spin::Once;

use crate::abi::{c_str_or_empty, fun_sig, MpObj, FUN_ARGS_MAX, MP_CONST_NONE};
use crate::gc::{Collector, HeapRegion, RootRange};
use crate::hal::{gd32w51x::Usart1, wait::Spin, Usart};
use crate::platform::{Platform, Runtime};
use crate::storage::{NoFilesystem, StorageProvider};
use crate::{fatal, infallible, Wait};

/// Platform published by the boot sequence for the C hooks.
pub static PLATFORM: Once<Platform<Usart1, Spin>> = Once::new();

#[allow(non_upper_case_globals)]
extern "C" {
    fn bare_main();
    fn gc_init(start: *mut c_void, end: *mut c_void);
    fn gc_collect_start();
    fn gc_collect_root(ptrs: *mut *mut c_void, len: usize);
    fn gc_collect_end();
    fn mp_raise_OSError(errno: c_int) -> !;
    static mp_type_fun_builtin_var: c_void;
}

fn platform() -> &'static Platform<Usart1, Spin> {
    match PLATFORM.get() {
        Some(platform) => platform,
        None => fatal::halt(format_args!("runtime hook called before boot")),
    }
}

/// The C runtime as seen by the boot sequence.
pub struct MicroPython;

impl Collector for MicroPython {
    fn register_heap(&mut self, heap: HeapRegion) {
        let range = heap.into_slice().as_mut_ptr_range();
        // SAFETY: the region is 'static and handed over exactly once.
        unsafe { gc_init(range.start.cast(), range.end.cast()) };
    }

    fn mark_roots(&mut self, roots: RootRange) {
        // SAFETY: the range covers live stack memory of the calling context.
        unsafe { gc_collect_root(roots.start() as *mut *mut c_void, roots.words()) };
    }
}

impl Runtime for MicroPython {
    fn run<U: Usart, W: Wait + Clone>(&mut self, _platform: &'static Platform<U, W>) {
        // SAFETY: called once, after the heap was registered.
        unsafe { bare_main() };
    }
}

/// # Safety
///
/// `s` must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn mp_hal_stdout_tx_strn_cooked(s: *const c_char, len: usize) {
    if s.is_null() || len == 0 {
        return;
    }
    let buf = core::slice::from_raw_parts(s.cast::<u8>(), len);
    infallible(platform().console().write_bytes_cooked(buf));
}

/// # Safety
///
/// `s` must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn mp_hal_stdout_tx_strn(s: *const c_char, len: usize) {
    if s.is_null() || len == 0 {
        return;
    }
    let buf = core::slice::from_raw_parts(s.cast::<u8>(), len);
    infallible(platform().console().write_bytes(buf));
}

/// # Safety
///
/// `s` must be a valid zero-terminated string.
#[no_mangle]
pub unsafe extern "C" fn mp_hal_stdout_tx_str(s: *const c_char) {
    if s.is_null() {
        return;
    }
    infallible(platform().console().write_cstr(CStr::from_ptr(s)));
}

#[no_mangle]
pub extern "C" fn mp_hal_stdin_rx_chr() -> c_int {
    c_int::from(infallible(platform().console().read_byte()))
}

#[no_mangle]
pub extern "C" fn mp_hal_delay_ms(ms: u32) {
    infallible(platform().delay_ms(ms));
}

#[no_mangle]
pub extern "C" fn mp_hal_ticks_ms() -> u32 {
    platform().ticks_ms()
}

#[no_mangle]
pub extern "C" fn gc_collect() {
    // SAFETY: collector bracket around a single root report.
    unsafe { gc_collect_start() };
    if let Err(err) = platform().collect_roots(&mut MicroPython) {
        fatal::halt(format_args!("gc: {}", err));
    }
    // SAFETY: matches the gc_collect_start above.
    unsafe { gc_collect_end() };
}

/// # Safety
///
/// `filename` must be a valid zero-terminated string or null.
#[no_mangle]
pub unsafe extern "C" fn mp_lexer_new_from_file(filename: *const c_char) -> *mut c_void {
    let name = c_str_or_empty(filename);
    match NoFilesystem.open_source_file(name) {
        Ok(never) => match never {},
        Err(err) => mp_raise_OSError(err.errno()),
    }
}

/// # Safety
///
/// `path` must be a valid zero-terminated string or null.
#[no_mangle]
pub unsafe extern "C" fn mp_import_stat(path: *const c_char) -> c_int {
    NoFilesystem.stat_import_path(c_str_or_empty(path)) as c_int
}

/// `open()` accepts anything and returns `None` without doing I/O.
#[no_mangle]
pub extern "C" fn mp_builtin_open(_n_args: usize, _args: *const MpObj, _kwargs: *mut c_void) -> MpObj {
    match NoFilesystem.builtin_open("", "r") {
        Some(never) => match never {},
        None => MP_CONST_NONE,
    }
}

type KwFun = extern "C" fn(usize, *const MpObj, *mut c_void) -> MpObj;

/// `mp_obj_fun_builtin_var_t`.
#[repr(C)]
pub struct FunBuiltinVar {
    base: *const c_void,
    sig: u32,
    fun: KwFun,
}

// SAFETY: immutable after link time.
unsafe impl Sync for FunBuiltinVar {}

#[no_mangle]
#[allow(non_upper_case_globals)]
pub static mp_builtin_open_obj: FunBuiltinVar = FunBuiltinVar {
    // SAFETY: only the address of the runtime's type object is taken.
    base: unsafe { core::ptr::addr_of!(mp_type_fun_builtin_var) },
    sig: fun_sig(1, FUN_ARGS_MAX, true),
    fun: mp_builtin_open,
};

#[no_mangle]
pub extern "C" fn nlr_jump_fail(val: *mut c_void) -> ! {
    fatal::halt(format_args!("uncaught NLR {:p}", val))
}
