//! Process-wide allocator instance
//!
//! One [`SegregatedAllocator`] with the crate's default block counts lives in
//! a `static`, so its pools never move and the first call anchors them for
//! the rest of the process.
//!
//! # Safety
//!
//! The instance is not synchronized. Every function here is `unsafe`: callers
//! must ensure no two threads use the process-wide allocator at the same
//! time. Use [`LockedAllocator`] when the allocator has to be shared.
//!
//! ```rust
//! unsafe {
//!     let block = segpool::global::allocate(15).expect("fresh pool");
//!     segpool::global::release(block.as_ptr());
//! }
//! ```
//!
//! [`LockedAllocator`]: crate::allocator::LockedAllocator

use core::ptr::NonNull;

use crate::allocator::{PoolSnapshot, SegregatedAllocator};
use crate::core::{SizeClass, SyncUnsafeCell};
use crate::error::PoolResult;

static GLOBAL: SyncUnsafeCell<SegregatedAllocator> =
    SyncUnsafeCell::new(SegregatedAllocator::new());

/// Shared reference to the process-wide instance.
///
/// # Safety
///
/// No other thread may use the instance while the reference is alive.
#[inline]
unsafe fn instance() -> &'static SegregatedAllocator {
    // SAFETY: GLOBAL is never mutably borrowed; all mutation goes through the
    // allocator's Cell/UnsafeCell fields, and the caller serializes access.
    unsafe { &*GLOBAL.get() }
}

/// Allocates from the process-wide pools; see [`SegregatedAllocator::allocate`].
///
/// # Safety
///
/// Calls into this module must not race with each other.
#[inline]
pub unsafe fn allocate(size: usize) -> Option<NonNull<u8>> {
    // SAFETY: forwarded caller contract.
    unsafe { instance() }.allocate(size)
}

/// Returns a block to the process-wide pools; see
/// [`SegregatedAllocator::release`].
///
/// # Safety
///
/// - calls into this module must not race with each other
/// - `ptr` must be null or a live block from [`allocate`]
#[inline]
pub unsafe fn release(ptr: *mut u8) {
    // SAFETY: forwarded caller contract.
    unsafe { instance().release(ptr) }
}

/// Checked allocation; see [`SegregatedAllocator::try_allocate`].
///
/// # Safety
///
/// Calls into this module must not race with each other.
pub unsafe fn try_allocate(size: usize) -> PoolResult<NonNull<u8>> {
    // SAFETY: forwarded caller contract.
    unsafe { instance() }.try_allocate(size)
}

/// Checked release; see [`SegregatedAllocator::try_release`].
///
/// # Safety
///
/// Same contract as [`release`].
pub unsafe fn try_release(ptr: *mut u8) -> PoolResult<SizeClass> {
    // SAFETY: forwarded caller contract.
    unsafe { instance().try_release(ptr) }
}

/// Free-list counts of the process-wide pools.
///
/// # Safety
///
/// Calls into this module must not race with each other.
pub unsafe fn snapshot() -> PoolSnapshot {
    // SAFETY: forwarded caller contract.
    unsafe { instance() }.snapshot()
}

/// Free-list integrity check of the process-wide pools.
///
/// # Safety
///
/// Calls into this module must not race with each other.
pub unsafe fn validate() -> PoolResult<()> {
    // SAFETY: forwarded caller contract.
    unsafe { instance() }.validate()
}

/// Prints the process-wide free-list counts to standard output.
///
/// # Safety
///
/// Calls into this module must not race with each other.
#[cfg(feature = "debug-probe")]
#[cfg_attr(docsrs, doc(cfg(feature = "debug-probe")))]
pub unsafe fn debug_print() {
    // SAFETY: forwarded caller contract.
    unsafe { instance() }.debug_print();
}
