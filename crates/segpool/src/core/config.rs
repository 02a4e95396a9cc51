//! Compile-time parameters of the allocator
//!
//! Payload bounds are part of the allocator's contract with its callers and
//! are fixed. Block counts default to 1024 small and 128 large blocks and can
//! be overridden when the crate is built:
//!
//! ```text
//! SEGPOOL_SMALL_POOL_BLOCKS=4096 SEGPOOL_LARGE_POOL_BLOCKS=256 cargo build
//! ```
//!
//! A malformed or zero override fails compilation.

/// Largest request (in bytes) served by the small class.
pub const REQ_SMALL: usize = 15;

/// Largest request (in bytes) served by the large class.
pub const REQ_LARGE: usize = 180;

/// Default number of blocks in the small pool.
pub const DEFAULT_SMALL_POOL_BLOCKS: usize = 1024;

/// Default number of blocks in the large pool.
pub const DEFAULT_LARGE_POOL_BLOCKS: usize = 128;

/// Number of blocks in the small pool of the default allocator.
pub const SMALL_POOL_BLOCKS: usize = parse_block_count(
    option_env!("SEGPOOL_SMALL_POOL_BLOCKS"),
    DEFAULT_SMALL_POOL_BLOCKS,
);

/// Number of blocks in the large pool of the default allocator.
pub const LARGE_POOL_BLOCKS: usize = parse_block_count(
    option_env!("SEGPOOL_LARGE_POOL_BLOCKS"),
    DEFAULT_LARGE_POOL_BLOCKS,
);

const _: () = assert!(REQ_SMALL < REQ_LARGE, "small class must be below large class");

/// Parse a decimal block count override, falling back to `default` when unset.
///
/// Evaluated at compile time for the crate constants, so every rejection
/// below surfaces as a build error.
pub const fn parse_block_count(value: Option<&str>, default: usize) -> usize {
    let bytes = match value {
        Some(value) => value.as_bytes(),
        None => return default,
    };
    assert!(!bytes.is_empty(), "block count override must not be empty");

    let mut count: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(
            digit.is_ascii_digit(),
            "block count override must be a decimal integer"
        );
        count = match count.checked_mul(10) {
            Some(shifted) => shifted,
            None => panic!("block count override overflows usize"),
        };
        count = match count.checked_add((digit - b'0') as usize) {
            Some(sum) => sum,
            None => panic!("block count override overflows usize"),
        };
        i += 1;
    }

    assert!(count > 0, "block count override must be non-zero");
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_override_uses_default() {
        assert_eq!(parse_block_count(None, 1024), 1024);
    }

    #[test]
    fn decimal_override_is_parsed() {
        assert_eq!(parse_block_count(Some("4096"), 1024), 4096);
        assert_eq!(parse_block_count(Some("1"), 1024), 1);
    }

    #[test]
    #[should_panic(expected = "decimal integer")]
    fn non_digit_override_is_rejected() {
        let _ = parse_block_count(Some("12k"), 1024);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_override_is_rejected() {
        let _ = parse_block_count(Some("0"), 1024);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn oversized_override_is_rejected() {
        let _ = parse_block_count(Some("999999999999999999999999"), 1024);
    }
}
