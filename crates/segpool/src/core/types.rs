//! Size classes and allocator lifecycle states

use core::fmt;

use super::config::{REQ_LARGE, REQ_SMALL};
use super::layout::{BLOCK_BYTES_LARGE, BLOCK_BYTES_SMALL};

/// One of the two block populations, each backed by its own pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// Requests of `0..=REQ_SMALL` bytes
    Small,
    /// Requests of `REQ_SMALL + 1..=REQ_LARGE` bytes
    Large,
}

impl SizeClass {
    /// Both classes, small first.
    pub const ALL: [Self; 2] = [Self::Small, Self::Large];

    /// Select the class serving a request of `size` bytes.
    ///
    /// Zero-byte requests are treated as one-byte requests. Returns `None`
    /// for sizes above the large class bound.
    #[inline]
    pub const fn for_size(size: usize) -> Option<Self> {
        let size = if size == 0 { 1 } else { size };
        if size <= REQ_SMALL {
            Some(Self::Small)
        } else if size <= REQ_LARGE {
            Some(Self::Large)
        } else {
            None
        }
    }

    /// Largest request this class accepts.
    #[inline]
    pub const fn request_limit(self) -> usize {
        match self {
            Self::Small => REQ_SMALL,
            Self::Large => REQ_LARGE,
        }
    }

    /// Byte size of one block of this class.
    #[inline]
    pub const fn block_bytes(self) -> usize {
        match self {
            Self::Small => BLOCK_BYTES_SMALL,
            Self::Large => BLOCK_BYTES_LARGE,
        }
    }

    /// Lowercase class name used in reports and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of an allocator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No allocate or release has run yet; free lists are unpopulated
    Uninitialized,
    /// Free lists are threaded and anchored to the allocator's address
    Ready,
    /// The allocator was moved after initialization and refuses all requests
    Relocated,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::Relocated => write!(f, "relocated"),
        }
    }
}
