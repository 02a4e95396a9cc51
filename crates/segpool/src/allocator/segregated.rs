//! Two-class segregated allocator
//!
//! # Safety
//!
//! The allocator keeps its pools inline and threads absolute block addresses
//! through them, so:
//!
//! - State lives in `Cell`s: the type is `Send` but not `Sync`. It is meant
//!   for one thread; share it only behind [`LockedAllocator`] or through the
//!   `unsafe` process-wide API in [`crate::global`]
//! - The first allocate or release anchors the allocator to its current
//!   address. A value moved afterwards never follows its stale links: it
//!   returns `None` from every allocation and ignores every release
//! - Moving before first use is harmless, initialization is lazy
//!
//! [`LockedAllocator`]: crate::allocator::LockedAllocator

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::ops::Range;
use core::ptr::{self, NonNull};

use super::pool::Pool;
use super::probe::{ClassSnapshot, PoolSnapshot};
use crate::core::config::{LARGE_POOL_BLOCKS, REQ_LARGE, SMALL_POOL_BLOCKS};
use crate::core::layout::{BLOCK_ALIGN, LARGE_BLOCK_WORDS, SMALL_BLOCK_WORDS};
use crate::core::{EngineState, SizeClass};
use crate::error::{PoolError, PoolResult};

#[cfg(feature = "logging")]
use tracing::debug;

/// Fixed-size allocator serving two size classes from two static pools
///
/// Requests of `0..=REQ_SMALL` bytes are served from the small pool, requests
/// up to `REQ_LARGE` bytes from the large pool, anything bigger is refused.
/// A class never borrows from the other one.
///
/// # Examples
///
/// ```rust
/// use segpool::SegregatedAllocator;
///
/// let allocator: Box<SegregatedAllocator> = Box::default();
///
/// let block = allocator.allocate(15).expect("small pool has room");
/// unsafe { allocator.release(block.as_ptr()) };
///
/// // LIFO reuse: the block just released comes back first.
/// assert_eq!(allocator.allocate(15), Some(block));
/// ```
pub struct SegregatedAllocator<
    const N_S: usize = SMALL_POOL_BLOCKS,
    const N_L: usize = LARGE_POOL_BLOCKS,
> {
    small: Pool<SMALL_BLOCK_WORDS, N_S>,
    large: Pool<LARGE_BLOCK_WORDS, N_L>,

    /// Address of `self` when the pools were threaded; zero until then
    anchor: Cell<usize>,
}

impl<const N_S: usize, const N_L: usize> SegregatedAllocator<N_S, N_L> {
    /// Creates an allocator whose pools are threaded on first use.
    pub const fn new() -> Self {
        Self {
            small: Pool::new(),
            large: Pool::new(),
            anchor: Cell::new(0),
        }
    }

    /// Number of blocks in the pool of `class`.
    #[inline]
    pub const fn capacity(class: SizeClass) -> usize {
        match class {
            SizeClass::Small => N_S,
            SizeClass::Large => N_L,
        }
    }

    #[inline]
    fn here(&self) -> usize {
        ptr::from_ref(self).addr()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        match self.anchor.get() {
            0 => EngineState::Uninitialized,
            anchor if anchor == self.here() => EngineState::Ready,
            _ => EngineState::Relocated,
        }
    }

    /// True once the first allocate or release has threaded the pools.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.anchor.get() != 0
    }

    /// Threads the pools on first use; false if the allocator was moved.
    #[inline]
    fn ensure_ready(&self) -> bool {
        match self.anchor.get() {
            0 => {
                self.initialize();
                true
            }
            anchor => anchor == self.here(),
        }
    }

    #[cold]
    fn initialize(&self) {
        self.small.thread();
        self.large.thread();
        self.anchor.set(self.here());
    }

    #[inline]
    fn pop(&self, class: SizeClass) -> Option<NonNull<u8>> {
        match class {
            SizeClass::Small => self.small.pop(),
            SizeClass::Large => self.large.pop(),
        }
    }

    /// Pool and byte offset of the block starting at `addr`.
    #[inline]
    fn locate(&self, addr: usize) -> Option<(SizeClass, usize)> {
        if let Some(offset) = self.small.block_offset(addr) {
            return Some((SizeClass::Small, offset));
        }
        self.large
            .block_offset(addr)
            .map(|offset| (SizeClass::Large, offset))
    }

    /// # Safety
    ///
    /// `offset` comes from `locate` for `class`; see [`Self::release`].
    #[inline]
    unsafe fn push(&self, class: SizeClass, offset: usize) {
        // SAFETY: forwarded caller contract.
        unsafe {
            match class {
                SizeClass::Small => self.small.push(offset),
                SizeClass::Large => self.large.push(offset),
            }
        }
    }

    /// Allocates a block able to hold `size` bytes.
    ///
    /// A zero-byte request is served like a one-byte request. Returns `None`
    /// when `size` exceeds the large class or the selected class is exhausted;
    /// the other class is never used as a fallback.
    ///
    /// The block is word aligned and its contents are unspecified.
    #[inline]
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if !self.ensure_ready() {
            return None;
        }
        self.pop(SizeClass::for_size(size)?)
    }

    /// Returns a block to its pool.
    ///
    /// Null pointers, calls made before the first allocation, and addresses
    /// that do not start a block of either pool are ignored.
    ///
    /// # Safety
    ///
    /// - `ptr` must be null or a block returned by [`Self::allocate`] on this
    ///   allocator that has not been released since
    /// - the caller must not access the block afterwards
    ///
    /// Releasing the same block twice is not detected here and corrupts the
    /// free list; [`Self::validate`] reports it afterwards.
    #[inline]
    pub unsafe fn release(&self, ptr: *mut u8) {
        // An anchor of zero never matches, so this also skips the
        // uninitialized case.
        if ptr.is_null() || self.anchor.get() != self.here() {
            return;
        }

        if let Some((class, offset)) = self.locate(ptr.addr()) {
            // SAFETY: offset was validated by locate; the caller guarantees
            // the block is live and not already free.
            unsafe { self.push(class, offset) };
        }
    }

    /// Classifies `ptr` by pool range and block boundary.
    ///
    /// Pure address arithmetic; does not initialize the allocator.
    pub fn classify(&self, ptr: *const u8) -> Option<SizeClass> {
        self.locate(ptr.addr()).map(|(class, _)| class)
    }

    /// Half-open address range of the pool backing `class`.
    pub fn pool_range(&self, class: SizeClass) -> Range<usize> {
        match class {
            SizeClass::Small => self.small.range(),
            SizeClass::Large => self.large.range(),
        }
    }

    // ========================================================================
    // Checked API
    // ========================================================================

    fn relocation_error(&self) -> PoolError {
        PoolError::relocated(self.anchor.get(), self.here())
    }

    /// Like [`Self::allocate`], reporting why a request was refused.
    pub fn try_allocate(&self, size: usize) -> PoolResult<NonNull<u8>> {
        if !self.ensure_ready() {
            return Err(self.relocation_error());
        }

        let class = SizeClass::for_size(size).ok_or_else(|| PoolError::unsupported(size, REQ_LARGE))?;
        self.pop(class)
            .ok_or_else(|| PoolError::exhausted(class, Self::capacity(class)))
    }

    /// Allocates for a layout; alignments above one machine word are refused.
    pub fn try_allocate_layout(&self, layout: Layout) -> PoolResult<NonNull<u8>> {
        if layout.align() > BLOCK_ALIGN {
            return Err(PoolError::invalid_alignment(layout.align(), BLOCK_ALIGN));
        }
        self.try_allocate(layout.size())
    }

    /// Like [`Self::release`], reporting why an address was not taken back.
    ///
    /// Returns the class the block went back to.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::release`].
    pub unsafe fn try_release(&self, ptr: *mut u8) -> PoolResult<SizeClass> {
        if ptr.is_null() {
            return Err(PoolError::foreign_pointer(0));
        }

        match self.state() {
            EngineState::Uninitialized => return Err(PoolError::Uninitialized),
            EngineState::Relocated => return Err(self.relocation_error()),
            EngineState::Ready => {}
        }

        let (class, offset) = self
            .locate(ptr.addr())
            .ok_or_else(|| PoolError::foreign_pointer(ptr.addr()))?;

        // SAFETY: offset validated by locate; liveness is the caller's contract.
        unsafe { self.push(class, offset) };
        Ok(class)
    }

    // ========================================================================
    // Debug probe
    // ========================================================================

    /// Counts the free blocks of each class without mutating anything.
    ///
    /// Counts are zero unless the allocator is [`EngineState::Ready`].
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state();
        let (small_free, large_free) = if state == EngineState::Ready {
            (self.small.audit().length, self.large.audit().length)
        } else {
            (0, 0)
        };

        PoolSnapshot {
            state,
            small: ClassSnapshot::new(SizeClass::Small, small_free, N_S),
            large: ClassSnapshot::new(SizeClass::Large, large_free, N_L),
        }
    }

    /// Checks every free-list link against its pool's range and block
    /// boundaries, and bounds each walk by the pool capacity.
    ///
    /// Detects the cycle a double free leaves behind and links clobbered by
    /// writes to released blocks. Never mutates the allocator.
    pub fn validate(&self) -> PoolResult<()> {
        match self.state() {
            EngineState::Uninitialized => return Ok(()),
            EngineState::Relocated => return Err(self.relocation_error()),
            EngineState::Ready => {}
        }

        if let Some(details) = self.small.audit().fault {
            return Err(PoolError::corruption(SizeClass::Small, details));
        }
        if let Some(details) = self.large.audit().fault {
            return Err(PoolError::corruption(SizeClass::Large, details));
        }
        Ok(())
    }

    /// Prints free-list lengths and block sizes to standard output.
    #[cfg(feature = "debug-probe")]
    #[cfg_attr(docsrs, doc(cfg(feature = "debug-probe")))]
    pub fn debug_print(&self) {
        let snapshot = self.snapshot();

        #[cfg(feature = "logging")]
        for class in SizeClass::ALL {
            let class_snapshot = snapshot.class(class);
            debug!(
                %class,
                free_blocks = class_snapshot.free_blocks,
                block_bytes = class_snapshot.block_bytes,
                "free list probe"
            );
        }

        println!("{snapshot}");
    }
}

impl<const N_S: usize, const N_L: usize> Default for SegregatedAllocator<N_S, N_L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N_S: usize, const N_L: usize> fmt::Debug for SegregatedAllocator<N_S, N_L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegregatedAllocator")
            .field("state", &self.state())
            .field("small_blocks", &N_S)
            .field("large_blocks", &N_L)
            .finish_non_exhaustive()
    }
}

// SAFETY: SegregatedAllocator is Send because:
// - Every raw pointer it holds points into its own inline storage
// - Moving the whole value to another thread moves that storage with it
// - It is not Sync: Cell state forbids shared use across threads
unsafe impl<const N_S: usize, const N_L: usize> Send for SegregatedAllocator<N_S, N_L> {}
