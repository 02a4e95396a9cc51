//! Core building blocks of the segregated allocator
//!
//! - Compile-time parameters and their build-time overrides
//! - Pool layout arithmetic
//! - Size classes and lifecycle states
//! - Internal synchronization primitive for the process-wide instance

pub mod config;
pub mod layout;
pub(crate) mod sync_cell;
pub mod types;

pub(crate) use sync_cell::SyncUnsafeCell;

pub use config::{LARGE_POOL_BLOCKS, REQ_LARGE, REQ_SMALL, SMALL_POOL_BLOCKS};
pub use layout::{BLOCK_ALIGN, BLOCK_BYTES_LARGE, BLOCK_BYTES_SMALL, WORD};
pub use types::{EngineState, SizeClass};
