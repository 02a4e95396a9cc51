//! Fixed-size block pool with an intrusive free list
//!
//! # Safety
//!
//! - Storage is an array of `N` blocks of `WORDS` machine words, so every
//!   block starts on a word boundary and can hold a pointer
//! - A free block's first word holds the address of the next free block
//!   (null at the tail); allocated blocks belong to the caller
//! - Every pointer written into the list is derived from the storage base,
//!   and every address taken back from a caller is re-derived from the base
//!   before it is written through
//!
//! # Memory Layout
//! ```text
//! base                                              base + N * BLOCK_BYTES
//! [Block0][Block1][Block2][Block3]...[BlockN-1]
//!    ↓       ↓       ↓
//! head → [free] → [free] → [free] → ... → null
//! ```

use core::cell::{Cell, UnsafeCell};
use core::ops::Range;
use core::ptr::{self, NonNull};

use crate::core::layout::{pool_bytes, words_bytes};

/// Node in the free list
///
/// Overlaid on the first word of a free block.
#[repr(C)]
struct FreeBlock {
    next: *mut FreeBlock,
}

/// Result of walking a free list without following any unchecked link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListAudit {
    /// Number of well-formed nodes visited
    pub(crate) length: usize,
    /// First structural fault found, if any
    pub(crate) fault: Option<&'static str>,
}

/// One pool of `N` blocks, each `WORDS` words wide.
pub(crate) struct Pool<const WORDS: usize, const N: usize> {
    storage: UnsafeCell<[[usize; WORDS]; N]>,
    head: Cell<*mut FreeBlock>,
}

impl<const WORDS: usize, const N: usize> Pool<WORDS, N> {
    /// Byte size of one block.
    pub(crate) const BLOCK_BYTES: usize = words_bytes(WORDS);

    /// Byte size of the whole pool.
    pub(crate) const POOL_BYTES: usize = pool_bytes(WORDS, N);

    /// Creates an unthreaded pool; its free list stays empty until
    /// [`Pool::thread`] runs.
    pub(crate) const fn new() -> Self {
        const {
            assert!(WORDS > 0, "blocks must hold at least one word");
            assert!(N > 0, "pools must hold at least one block");
        }

        Self {
            storage: UnsafeCell::new([[0; WORDS]; N]),
            head: Cell::new(ptr::null_mut()),
        }
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        self.storage.get().cast::<u8>()
    }

    /// Address of block 0.
    #[inline]
    pub(crate) fn base_addr(&self) -> usize {
        self.base().addr()
    }

    /// Half-open address range covered by the pool.
    pub(crate) fn range(&self) -> Range<usize> {
        let base = self.base_addr();
        base..base + Self::POOL_BYTES
    }

    /// Pointer to the block starting `offset` bytes into the pool.
    ///
    /// `offset` must be a block boundary below `POOL_BYTES`.
    #[inline]
    fn block_at(&self, offset: usize) -> *mut FreeBlock {
        debug_assert!(offset < Self::POOL_BYTES);
        debug_assert!(offset.is_multiple_of(Self::BLOCK_BYTES));
        // SAFETY: offset lies inside the storage array (contract above), so
        // the resulting pointer stays within the same allocation.
        unsafe { self.base().add(offset) }.cast::<FreeBlock>()
    }

    /// Links every block onto the free list so that blocks pop in ascending
    /// address order, block 0 first.
    pub(crate) fn thread(&self) {
        for index in 0..N {
            let block = self.block_at(index * Self::BLOCK_BYTES);
            let next = if index + 1 < N {
                self.block_at((index + 1) * Self::BLOCK_BYTES)
            } else {
                ptr::null_mut()
            };

            // SAFETY: Writing the next pointer into a block during threading.
            // - block is word aligned and at least one word wide
            // - storage is behind UnsafeCell, so writing through &self is allowed
            // - the engine threads a pool only before handing out any block
            unsafe { block.write(FreeBlock { next }) };
        }

        self.head.set(self.block_at(0));
    }

    /// Pops the head block, or `None` when the pool is exhausted.
    #[inline]
    pub(crate) fn pop(&self) -> Option<NonNull<u8>> {
        let head = NonNull::new(self.head.get())?;

        // SAFETY: Reading the next pointer of the head block.
        // - head was produced by thread() or push(), both derive it from base
        // - head is a free block, so its first word is a list link
        let next = unsafe { head.as_ptr().read().next };
        self.head.set(next);

        Some(head.cast::<u8>())
    }

    /// Byte offset of `addr` inside the pool if it starts a block.
    #[inline]
    pub(crate) fn block_offset(&self, addr: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base_addr())?;
        (offset < Self::POOL_BYTES && offset.is_multiple_of(Self::BLOCK_BYTES)).then_some(offset)
    }

    /// Pushes the block at `offset` onto the head of the free list.
    ///
    /// # Safety
    ///
    /// - `offset` must come from [`Pool::block_offset`]
    /// - the block must not already be on the free list
    /// - nobody may access the block after it is pushed
    #[inline]
    pub(crate) unsafe fn push(&self, offset: usize) {
        let block = self.block_at(offset);

        // SAFETY: block is a validated block start (caller contract); its
        // first word becomes the list link.
        unsafe { block.write(FreeBlock { next: self.head.get() }) };
        self.head.set(block);
    }

    /// Walks the free list, checking every link before following it.
    ///
    /// Stops at the first node outside the pool or off a block boundary, and
    /// after `N` nodes, which catches the cycle a double free creates.
    pub(crate) fn audit(&self) -> ListAudit {
        let mut length = 0;
        let mut node = self.head.get();

        while !node.is_null() {
            if length == N {
                return ListAudit {
                    length,
                    fault: Some("free list is longer than the pool (cycle)"),
                };
            }

            let Some(offset) = self.block_offset(node.addr()) else {
                return ListAudit {
                    length,
                    fault: Some("link outside the pool or off a block boundary"),
                };
            };

            length += 1;
            // SAFETY: offset is a validated block start; the link is read
            // through a pointer re-derived from base.
            node = unsafe { self.block_at(offset).read().next };
        }

        ListAudit {
            length,
            fault: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type SmallPool = Pool<2, 4>;

    #[test]
    fn sizes_follow_the_layout_arithmetic() {
        use crate::core::layout::{
            BLOCK_BYTES_LARGE, BLOCK_BYTES_SMALL, LARGE_BLOCK_WORDS, SMALL_BLOCK_WORDS,
        };

        assert_eq!(Pool::<SMALL_BLOCK_WORDS, 4>::BLOCK_BYTES, BLOCK_BYTES_SMALL);
        assert_eq!(Pool::<LARGE_BLOCK_WORDS, 4>::BLOCK_BYTES, BLOCK_BYTES_LARGE);
        assert_eq!(Pool::<LARGE_BLOCK_WORDS, 4>::POOL_BYTES, 4 * BLOCK_BYTES_LARGE);
    }

    #[test]
    fn unthreaded_pool_is_empty() {
        let pool = SmallPool::new();
        assert!(pool.pop().is_none());
        assert_eq!(pool.audit().length, 0);
    }

    #[test]
    fn threaded_pool_pops_in_ascending_order() {
        let pool = SmallPool::new();
        pool.thread();

        let base = pool.base_addr();
        for index in 0..4 {
            let block = pool.pop().unwrap();
            assert_eq!(block.as_ptr().addr(), base + index * SmallPool::BLOCK_BYTES);
        }
        assert!(pool.pop().is_none());
    }

    #[test]
    fn push_is_lifo() {
        let pool = SmallPool::new();
        pool.thread();

        let a = pool.pop().unwrap();
        let b = pool.pop().unwrap();
        unsafe {
            pool.push(pool.block_offset(a.as_ptr().addr()).unwrap());
            pool.push(pool.block_offset(b.as_ptr().addr()).unwrap());
        }

        assert_eq!(pool.pop(), Some(b));
        assert_eq!(pool.pop(), Some(a));
    }

    #[test]
    fn block_offset_checks_range_and_boundary() {
        let pool = SmallPool::new();
        let base = pool.base_addr();

        assert_eq!(pool.block_offset(base), Some(0));
        assert_eq!(
            pool.block_offset(base + SmallPool::BLOCK_BYTES),
            Some(SmallPool::BLOCK_BYTES)
        );
        assert_eq!(pool.block_offset(base + 1), None);
        assert_eq!(pool.block_offset(base + SmallPool::POOL_BYTES), None);
        assert_eq!(pool.block_offset(base.wrapping_sub(SmallPool::BLOCK_BYTES)), None);
        assert_eq!(pool.range(), base..base + SmallPool::POOL_BYTES);
    }

    #[test]
    fn audit_counts_a_full_list() {
        let pool = SmallPool::new();
        pool.thread();

        let audit = pool.audit();
        assert_eq!(audit.length, 4);
        assert_eq!(audit.fault, None);
    }

    #[test]
    fn audit_detects_a_double_push() {
        let pool = SmallPool::new();
        pool.thread();

        let block = pool.pop().unwrap();
        let offset = pool.block_offset(block.as_ptr().addr()).unwrap();
        unsafe {
            pool.push(offset);
            pool.push(offset);
        }

        let audit = pool.audit();
        assert!(audit.fault.is_some());
        assert_eq!(audit.length, 4);
    }

    #[test]
    fn audit_stops_at_a_clobbered_link() {
        let pool = SmallPool::new();
        pool.thread();

        // Caller scribbles over a block after releasing it.
        let block = pool.pop().unwrap();
        let offset = pool.block_offset(block.as_ptr().addr()).unwrap();
        unsafe {
            pool.push(offset);
            block.as_ptr().cast::<usize>().write(0x10);
        }

        let audit = pool.audit();
        assert_eq!(audit.length, 1);
        assert!(audit.fault.is_some());
    }
}
