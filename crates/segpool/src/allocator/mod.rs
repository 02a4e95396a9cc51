//! Allocator implementations
//!
//! - [`SegregatedAllocator`]: the single-threaded two-class engine
//! - [`LockedAllocator`]: spin-locked wrapper implementing `GlobalAlloc`
//! - [`PoolSnapshot`]: free-list probe results

mod pool;

pub mod locked;
pub mod probe;
pub mod segregated;

pub use locked::LockedAllocator;
pub use probe::{ClassSnapshot, PoolSnapshot};
pub use segregated::SegregatedAllocator;
