//! Spin-locked wrapper for use as the process allocator
//!
//! [`SegregatedAllocator`] is single-threaded. `LockedAllocator` serializes
//! every call through a `spin::Mutex`, which needs no host allocator and no
//! OS support, and implements [`GlobalAlloc`]:
//!
//! ```rust,no_run
//! use segpool::LockedAllocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: LockedAllocator = LockedAllocator::new();
//!
//! fn main() {}
//! ```
//!
//! Only requests within the two classes succeed, so the whole program
//! (including std) must fit the envelope; anything else sees a null
//! allocation and aborts through `handle_alloc_error`.

use core::alloc::{GlobalAlloc, Layout};
use core::fmt;
use core::ptr::{self, NonNull};

use spin::Mutex;

use super::probe::PoolSnapshot;
use super::segregated::SegregatedAllocator;
use crate::core::config::{LARGE_POOL_BLOCKS, SMALL_POOL_BLOCKS};
use crate::core::layout::BLOCK_ALIGN;
use crate::core::SizeClass;
use crate::error::PoolResult;

/// Thread-safe segregated allocator
pub struct LockedAllocator<
    const N_S: usize = SMALL_POOL_BLOCKS,
    const N_L: usize = LARGE_POOL_BLOCKS,
> {
    inner: Mutex<SegregatedAllocator<N_S, N_L>>,
}

impl<const N_S: usize, const N_L: usize> LockedAllocator<N_S, N_L> {
    /// Creates a locked allocator; usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(SegregatedAllocator::new()),
        }
    }

    /// Runs `f` with exclusive access to the engine.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&SegregatedAllocator<N_S, N_L>) -> R) -> R {
        let engine = self.inner.lock();
        f(&*engine)
    }

    /// See [`SegregatedAllocator::allocate`].
    #[inline]
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        self.with(|engine| engine.allocate(size))
    }

    /// See [`SegregatedAllocator::release`].
    ///
    /// # Safety
    ///
    /// Same contract as [`SegregatedAllocator::release`].
    #[inline]
    pub unsafe fn release(&self, ptr: *mut u8) {
        // SAFETY: forwarded caller contract.
        self.with(|engine| unsafe { engine.release(ptr) });
    }

    /// See [`SegregatedAllocator::classify`].
    pub fn classify(&self, ptr: *const u8) -> Option<SizeClass> {
        self.with(|engine| engine.classify(ptr))
    }

    /// See [`SegregatedAllocator::snapshot`].
    pub fn snapshot(&self) -> PoolSnapshot {
        self.with(SegregatedAllocator::<N_S, N_L>::snapshot)
    }

    /// See [`SegregatedAllocator::validate`].
    pub fn validate(&self) -> PoolResult<()> {
        self.with(SegregatedAllocator::<N_S, N_L>::validate)
    }
}

impl<const N_S: usize, const N_L: usize> Default for LockedAllocator<N_S, N_L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N_S: usize, const N_L: usize> fmt::Debug for LockedAllocator<N_S, N_L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(engine) => f.debug_tuple("LockedAllocator").field(&*engine).finish(),
            None => f.write_str("LockedAllocator(<locked>)"),
        }
    }
}

// SAFETY: LockedAllocator implements GlobalAlloc for word-aligned requests.
// - Every call goes through the spin lock, so the engine is never shared
// - alloc refuses alignments above one word before touching the pools
// - dealloc only pushes addresses that classify to a block of this allocator
// - realloc keeps the default allocate-copy-free path
unsafe impl<const N_S: usize, const N_L: usize> GlobalAlloc for LockedAllocator<N_S, N_L> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > BLOCK_ALIGN {
            return ptr::null_mut();
        }
        self.allocate(layout.size())
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // SAFETY: GlobalAlloc requires ptr to come from this allocator's alloc.
        unsafe { self.release(ptr) };
    }
}
