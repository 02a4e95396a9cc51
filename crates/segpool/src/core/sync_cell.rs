//! Shareable interior mutability for the process-wide allocator.
//!
//! This module provides `SyncUnsafeCell`, a wrapper around `UnsafeCell` that
//! implements `Sync` so a single-threaded allocator can live in a `static`.
//! Every access path through it is an `unsafe fn` whose caller promises that
//! no two threads touch the value at the same time.

use core::cell::UnsafeCell;

/// A wrapper around `UnsafeCell<T>` that implements `Sync`.
///
/// # Safety
///
/// The caller must ensure that access to the inner value is externally
/// serialized. The type exists only to hold `static` state whose public
/// accessors are already `unsafe` for exactly that reason.
#[repr(transparent)]
pub(crate) struct SyncUnsafeCell<T: ?Sized>(UnsafeCell<T>);

// SAFETY: SyncUnsafeCell<T> is Sync if T is Send.
// - Sharing only hands out raw pointers via `get`
// - Every dereference happens in an `unsafe fn` that requires serialized use
// - T: Send ensures the value may be touched from whichever thread holds it
unsafe impl<T: ?Sized + Send> Sync for SyncUnsafeCell<T> {}

impl<T> SyncUnsafeCell<T> {
    /// Creates a new `SyncUnsafeCell` containing the given value.
    #[inline]
    pub(crate) const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }
}

impl<T: ?Sized> SyncUnsafeCell<T> {
    /// Gets a mutable pointer to the wrapped value.
    #[inline]
    pub(crate) const fn get(&self) -> *mut T {
        self.0.get()
    }
}
