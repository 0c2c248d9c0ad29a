// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Collector cooperation: fixed heap hand-off and conservative stack root scan
//! OWNERS: @port-team
//! STATUS: Functional
//! PUBLIC API: StackTop::capture(), StackBounds::collect_roots(), HeapArena::take(), Collector
//! DEPENDS_ON: arch::cortex_m::{read_sp, spill_callee_saved}
//! INVARIANTS: Stack top captured once before any other boot work; scanned range is
//!             [current sp, stack top) with sp <= top; heap handed out at most once
//!
//! The stack grows downwards. The root range starts at the stack pointer
//! observed inside `collect_roots` itself and ends at the top recorded at
//! reset, so every frame between the entry point and the collector is
//! scanned, including r4-r11 which are spilled into the scanning frame first.

use core::cell::UnsafeCell;
use core::mem::size_of;
use core::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::arch::cortex_m;

/// Word size of a root slot.
pub const WORD: usize = size_of::<usize>();

/// Stack pointer recorded at reset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StackTop(usize);

impl StackTop {
    /// Reads the stack pointer of the calling frame.
    ///
    /// Call this as the first statement of the reset entry point, before any
    /// other function call pushes a frame.
    #[inline(always)]
    pub fn capture() -> Self {
        Self(cortex_m::read_sp())
    }

    /// Wraps a known address, e.g. the linker's `_stack_start`.
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }
}

/// Word-granular interval of possibly-live references.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RootRange {
    start: *const usize,
    words: usize,
    high: usize,
}

impl RootRange {
    /// Range `[low, high)` counted in whole words.
    pub fn between(low: usize, high: usize) -> Result<Self, RootScanError> {
        if low > high {
            return Err(RootScanError::StackAboveTop { sp: low, top: high });
        }
        Ok(Self { start: low as *const usize, words: (high - low) / WORD, high })
    }

    pub fn start(&self) -> *const usize {
        self.start
    }

    /// Number of word-sized slots in the range.
    pub fn words(&self) -> usize {
        self.words
    }

    pub fn low(&self) -> usize {
        self.start as usize
    }

    /// The recorded stack top. The last partial word, if any, is not scanned.
    pub fn high(&self) -> usize {
        self.high
    }
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum RootScanError {
    #[error("stack pointer {sp:#x} above recorded stack top {top:#x}")]
    StackAboveTop { sp: usize, top: usize },
}

/// The collector primitives this layer drives.
pub trait Collector {
    /// Hands the arena to the collector. Called once at boot.
    fn register_heap(&mut self, heap: HeapRegion);
    /// Treats every slot of `roots` as a possibly-live reference.
    fn mark_roots(&mut self, roots: RootRange);
}

/// Live stack bounds known to the platform.
#[derive(Clone, Copy, Debug)]
pub struct StackBounds {
    top: StackTop,
}

impl StackBounds {
    pub const fn new(top: StackTop) -> Self {
        Self { top }
    }

    /// Reports the in-use stack to `collector` as a root range.
    ///
    /// Never inlined: the low boundary is read inside this frame, after the
    /// callee-saved registers have been stored into it.
    #[inline(never)]
    pub fn collect_roots<C: Collector + ?Sized>(&self, collector: &mut C) -> Result<(), RootScanError> {
        let mut spilled = [0usize; cortex_m::CALLEE_SAVED];
        cortex_m::spill_callee_saved(&mut spilled);
        let sp = cortex_m::read_sp();
        let roots = RootRange::between(sp, self.top.addr())?;
        collector.mark_roots(roots);
        core::hint::black_box(&spilled);
        Ok(())
    }
}

#[repr(C, align(8))]
struct Aligned<const N: usize>([u8; N]);

/// Statically reserved heap storage.
pub struct HeapArena<const N: usize> {
    taken: AtomicBool,
    bytes: UnsafeCell<Aligned<N>>,
}

// SAFETY: the buffer is reachable only through the single `HeapRegion` handed
// out by `take`.
unsafe impl<const N: usize> Sync for HeapArena<N> {}

impl<const N: usize> HeapArena<N> {
    pub const fn new() -> Self {
        Self { taken: AtomicBool::new(false), bytes: UnsafeCell::new(Aligned([0; N])) }
    }

    /// Hands out the whole arena. Returns `None` after the first call.
    pub fn take(&'static self) -> Option<HeapRegion> {
        if self.taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        // SAFETY: the flag above guarantees this is the only reference ever created.
        let bytes = unsafe { &mut (*self.bytes.get()).0 };
        Some(HeapRegion { bytes })
    }
}

impl<const N: usize> Default for HeapArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Contiguous byte range owned by the collector once registered.
pub struct HeapRegion {
    bytes: &'static mut [u8],
}

impl HeapRegion {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Start and one-past-end pointers, as `gc_init` expects them.
    pub fn as_mut_ptr_range(&mut self) -> core::ops::Range<*mut u8> {
        self.bytes.as_mut_ptr_range()
    }

    pub fn into_slice(self) -> &'static mut [u8] {
        self.bytes
    }
}

impl core::fmt::Debug for HeapRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeapRegion")
            .field("start", &self.bytes.as_ptr())
            .field("len", &self.bytes.len())
            .finish()
    }
}
