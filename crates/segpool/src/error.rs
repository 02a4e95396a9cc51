//! Error types for the checked allocator API
//!
//! The raw `allocate`/`release` paths signal failure in-band (`None` or a
//! silent no-op). The `try_*` variants and the validator report the reason
//! through [`PoolError`].

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

use crate::core::SizeClass;

// ============================================================================
// Main Error Type
// ============================================================================

/// Segregated pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    // --- Allocation Errors ---
    #[error("Allocation of {size} bytes is not supported (max: {max})")]
    Unsupported { size: usize, max: usize },

    #[error("{class} pool exhausted (capacity: {capacity} blocks)")]
    Exhausted { class: SizeClass, capacity: usize },

    #[error("Invalid alignment: {align} (max: {max})")]
    InvalidAlignment { align: usize, max: usize },

    // --- Release Errors ---
    #[error("Address {addr:#x} does not start a block of any pool")]
    ForeignPointer { addr: usize },

    #[error("Release before the allocator was initialized")]
    Uninitialized,

    // --- Integrity Errors ---
    #[error("Free list corruption in {class} pool: {details}")]
    Corruption {
        class: SizeClass,
        details: &'static str,
    },

    #[error("Allocator moved from {from:#x} to {to:#x} after initialization")]
    Relocated { from: usize, to: usize },
}

impl PoolError {
    /// Check if error is retryable
    ///
    /// Only exhaustion clears up on its own, once blocks are released.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } => "POOL:ALLOC:UNSUPPORTED",
            Self::Exhausted { .. } => "POOL:EXHAUSTED",
            Self::InvalidAlignment { .. } => "POOL:ALLOC:ALIGN",
            Self::ForeignPointer { .. } => "POOL:RELEASE:FOREIGN",
            Self::Uninitialized => "POOL:RELEASE:UNINIT",
            Self::Corruption { .. } => "POOL:CORRUPTION",
            Self::Relocated { .. } => "POOL:RELOCATED",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create unsupported size error
    pub fn unsupported(size: usize, max: usize) -> Self {
        Self::Unsupported { size, max }
    }

    /// Create pool exhausted error
    pub fn exhausted(class: SizeClass, capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(%class, capacity, "segregated pool exhausted");

        Self::Exhausted { class, capacity }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(align: usize, max: usize) -> Self {
        Self::InvalidAlignment { align, max }
    }

    /// Create foreign pointer error
    pub fn foreign_pointer(addr: usize) -> Self {
        Self::ForeignPointer { addr }
    }

    /// Create free list corruption error
    pub fn corruption(class: SizeClass, details: &'static str) -> Self {
        #[cfg(feature = "logging")]
        error!(%class, details, "free list corruption");

        Self::Corruption { class, details }
    }

    /// Create relocation error
    pub fn relocated(from: usize, to: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(from, to, "allocator relocated after initialization");

        Self::Relocated { from, to }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for checked pool operations
pub type PoolResult<T> = Result<T, PoolError>;

// ============================================================================
// Tests
// ============================================================================
