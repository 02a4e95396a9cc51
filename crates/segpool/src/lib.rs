//! # segpool
//!
//! Fixed-size, two-class segregated pool allocator.
//!
//! Requests are routed by size to one of two statically sized pools:
//! - small class: requests of up to 15 bytes, 1024 blocks by default
//! - large class: requests of up to 180 bytes, 128 blocks by default
//!
//! Each pool is a contiguous array of equal-sized, word-aligned blocks. Free
//! blocks are chained through their own first word (intrusive LIFO list), so
//! allocation and release are O(1) with no per-block header. Pools are
//! threaded lazily on first use. Classes never borrow from each other, and
//! nothing is ever obtained from the host allocator.
//!
//! ## Quick Start
//!
//! ```rust
//! use segpool::prelude::*;
//!
//! let allocator: Box<SegregatedAllocator> = Box::default();
//!
//! let small = allocator.allocate(15).expect("small pool has room");
//! let large = allocator.allocate(180).expect("large pool has room");
//! assert_eq!(allocator.classify(small.as_ptr()), Some(SizeClass::Small));
//! assert_eq!(allocator.allocate(181), None);
//!
//! unsafe {
//!     allocator.release(small.as_ptr());
//!     allocator.release(large.as_ptr());
//! }
//! assert!(allocator.snapshot().is_pristine());
//! ```
//!
//! ## Features
//!
//! - `std` (default): link the standard library
//! - `debug-probe` (default): `debug_print` free-list reports on stdout
//! - `logging`: structured `tracing` events on error construction and probes
//!
//! ## Architecture
//!
//! - [`core`]: parameters, layout arithmetic, size classes
//! - [`allocator`]: the engine, its locked `GlobalAlloc` wrapper, probes
//! - [`global`]: the unsynchronized process-wide instance
//! - [`error`]: errors of the checked API

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Raw block handling is the whole crate
#![allow(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
// Block pointers are derived from word-array storage
#![allow(clippy::cast_ptr_alignment)]

pub mod allocator;
pub mod core;
pub mod error;
pub mod global;

pub use crate::allocator::{ClassSnapshot, LockedAllocator, PoolSnapshot, SegregatedAllocator};
pub use crate::core::{
    BLOCK_ALIGN, BLOCK_BYTES_LARGE, BLOCK_BYTES_SMALL, EngineState, LARGE_POOL_BLOCKS, REQ_LARGE,
    REQ_SMALL, SMALL_POOL_BLOCKS, SizeClass, WORD,
};
pub use crate::error::{PoolError, PoolResult};

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::allocator::{ClassSnapshot, LockedAllocator, PoolSnapshot, SegregatedAllocator};
    pub use crate::core::{EngineState, REQ_LARGE, REQ_SMALL, SizeClass};
    pub use crate::error::{PoolError, PoolResult};
}
