//! Pool layout arithmetic
//!
//! A block is the request bound rounded up to whole machine words, and never
//! smaller than one word so a free block can carry its next pointer:
//!
//! ```text
//! block_bytes = W * ceil(max(REQ, W) / W)
//! ```
//!
//! On a 64-bit target the defaults give 16-byte small blocks and 184-byte
//! large blocks; nothing in the crate relies on those literals.

use super::config::{REQ_LARGE, REQ_SMALL};

/// Native pointer width in bytes.
pub const WORD: usize = size_of::<*mut u8>();

/// Alignment guaranteed for every block address.
///
/// Pools are arrays of `usize` words and blocks are whole words, so each block
/// starts on a word boundary.
pub const BLOCK_ALIGN: usize = align_of::<usize>();

const _: () = assert!(size_of::<usize>() == WORD);
const _: () = assert!(BLOCK_ALIGN >= align_of::<*mut u8>());

/// Number of words needed to hold a block for requests up to `req` bytes.
#[inline]
pub const fn block_words(req: usize, word: usize) -> usize {
    let payload = if req > word { req } else { word };
    payload.div_ceil(word)
}

/// Byte size of a block for requests up to `req` bytes.
#[inline]
pub const fn block_bytes(req: usize, word: usize) -> usize {
    block_words(req, word) * word
}

/// Byte size of a block of `words` native words.
#[inline]
pub const fn words_bytes(words: usize) -> usize {
    words * WORD
}

/// Byte size of a pool of `count` blocks, each `words` native words wide.
#[inline]
pub const fn pool_bytes(words: usize, count: usize) -> usize {
    words_bytes(words) * count
}

/// Words per small block.
pub const SMALL_BLOCK_WORDS: usize = block_words(REQ_SMALL, WORD);

/// Words per large block.
pub const LARGE_BLOCK_WORDS: usize = block_words(REQ_LARGE, WORD);

/// Bytes per small block.
pub const BLOCK_BYTES_SMALL: usize = words_bytes(SMALL_BLOCK_WORDS);

/// Bytes per large block.
pub const BLOCK_BYTES_LARGE: usize = words_bytes(LARGE_BLOCK_WORDS);
