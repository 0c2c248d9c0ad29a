// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: MicroPython object-model encodings used by the C hooks
//! OWNERS: @port-team
//! PUBLIC API: MpObj, MP_CONST_NONE, fun_sig(), FUN_ARGS_MAX, c_str_or_empty()
//! INVARIANTS: Encodings match a 32-bit MicroPython build with the default object representation

use core::ffi::{c_char, c_void, CStr};

/// `mp_obj_t`.
pub type MpObj = *const c_void;

/// `None` encoded as an immediate object (`MP_OBJ_NEW_IMMEDIATE_OBJ(0)`).
pub const MP_CONST_NONE: MpObj = 0b110usize as MpObj;

/// `MP_OBJ_FUN_ARGS_MAX`.
pub const FUN_ARGS_MAX: u32 = 0xffff;

/// `MP_OBJ_FUN_MAKE_SIG`: minimum and maximum argument counts plus the keyword flag.
pub const fn fun_sig(n_args_min: u32, n_args_max: u32, takes_kw: bool) -> u32 {
    (n_args_min << 17) | (n_args_max << 1) | takes_kw as u32
}

/// Borrows a C string as UTF-8. Null pointers and invalid UTF-8 read as `""`.
///
/// # Safety
///
/// `s` must be null or point to a zero-terminated string that outlives `'a`.
pub unsafe fn c_str_or_empty<'a>(s: *const c_char) -> &'a str {
    if s.is_null() {
        return "";
    }
    CStr::from_ptr(s).to_str().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_signature_takes_one_or_more_args_and_keywords() {
        let sig = fun_sig(1, FUN_ARGS_MAX, true);
        assert_eq!(sig, 0x0003_ffff);
        assert_eq!(sig >> 17, 1);
        assert_eq!((sig >> 1) & 0xffff, FUN_ARGS_MAX);
        assert_eq!(sig & 1, 1);
        assert_eq!(fun_sig(0, 2, false), 0b100);
    }

    #[test]
    fn none_is_an_immediate_object() {
        let bits = MP_CONST_NONE as usize;
        assert_eq!(bits & 0b111, 0b110);
        assert_eq!(bits >> 3, 0);
    }

    #[test]
    fn c_strings_fall_back_to_empty() {
        let name = CStr::from_bytes_with_nul(b"boot.py\0").unwrap();
        let bad = CStr::from_bytes_with_nul(b"\xff\xfe\0").unwrap();
        unsafe {
            assert_eq!(c_str_or_empty(name.as_ptr()), "boot.py");
            assert_eq!(c_str_or_empty(bad.as_ptr()), "");
            assert_eq!(c_str_or_empty(core::ptr::null()), "");
        }
    }
}
