//! Free-list probe results
//!
//! A snapshot is taken by walking each free list; it never mutates the
//! allocator. Counts are only meaningful between API calls.

use core::fmt;

use crate::core::{EngineState, SizeClass};

/// Free-list state of one size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSnapshot {
    /// Class this snapshot describes
    pub class: SizeClass,
    /// Blocks currently on the free list
    pub free_blocks: usize,
    /// Blocks in the pool
    pub capacity: usize,
    /// Byte size of each block
    pub block_bytes: usize,
}

impl ClassSnapshot {
    pub(crate) const fn new(class: SizeClass, free_blocks: usize, capacity: usize) -> Self {
        Self {
            class,
            free_blocks,
            capacity,
            block_bytes: class.block_bytes(),
        }
    }

    /// Blocks currently held by callers.
    #[inline]
    pub const fn allocated_blocks(&self) -> usize {
        self.capacity.saturating_sub(self.free_blocks)
    }

    /// True when every block of the class is on its free list.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.free_blocks == self.capacity
    }

    /// True when no block of the class is available.
    #[inline]
    pub const fn is_exhausted(&self) -> bool {
        self.free_blocks == 0
    }
}

impl fmt::Display for ClassSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocks: {} of {} free ({} bytes each)",
            self.class, self.free_blocks, self.capacity, self.block_bytes
        )
    }
}

/// Free-list state of the whole allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Lifecycle state; counts are zero unless `Ready`
    pub state: EngineState,
    /// Small class
    pub small: ClassSnapshot,
    /// Large class
    pub large: ClassSnapshot,
}

impl PoolSnapshot {
    /// Snapshot of one class.
    pub const fn class(&self, class: SizeClass) -> &ClassSnapshot {
        match class {
            SizeClass::Small => &self.small,
            SizeClass::Large => &self.large,
        }
    }

    /// True when the allocator is initialized and every block is free.
    pub const fn is_pristine(&self) -> bool {
        matches!(self.state, EngineState::Ready) && self.small.is_full() && self.large.is_full()
    }
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "segregated pools ({})", self.state)?;
        writeln!(f, "  {}", self.small)?;
        writeln!(f, "  {}", self.large)
    }
}
