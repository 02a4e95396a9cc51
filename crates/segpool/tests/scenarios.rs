//! End-to-end behavior of the segregated allocator with default parameters

use std::collections::HashSet;
use std::ptr::{self, NonNull};

use segpool::prelude::*;
use segpool::{BLOCK_BYTES_LARGE, BLOCK_BYTES_SMALL, LARGE_POOL_BLOCKS, SMALL_POOL_BLOCKS};

fn allocator() -> Box<SegregatedAllocator> {
    Box::default()
}

fn release_all(allocator: &SegregatedAllocator, blocks: &[NonNull<u8>]) {
    for block in blocks {
        unsafe { allocator.release(block.as_ptr()) };
    }
}

#[cfg(target_pointer_width = "64")]
#[test]
fn block_sizes_on_64_bit() {
    assert_eq!(BLOCK_BYTES_SMALL, 16);
    assert_eq!(BLOCK_BYTES_LARGE, 184);
}

#[test]
fn fresh_allocate_release_allocate_reuses_the_block() {
    let allocator = allocator();

    let first = allocator.allocate(15).expect("fresh small pool");
    unsafe { allocator.release(first.as_ptr()) };
    let second = allocator.allocate(15).expect("block was released");

    assert_eq!(first, second);
}

#[test]
fn classes_are_independent() {
    let allocator = allocator();

    let small = allocator.allocate(15).expect("fresh small pool");
    let large = allocator.allocate(180).expect("fresh large pool");
    assert_ne!(small, large);
    assert_eq!(allocator.classify(small.as_ptr()), Some(SizeClass::Small));
    assert_eq!(allocator.classify(large.as_ptr()), Some(SizeClass::Large));
    assert!(!allocator.pool_range(SizeClass::Small).contains(&large.as_ptr().addr()));
    assert!(!allocator.pool_range(SizeClass::Large).contains(&small.as_ptr().addr()));

    release_all(&allocator, &[small, large]);

    let snapshot = allocator.snapshot();
    assert_eq!(snapshot.small.free_blocks, SMALL_POOL_BLOCKS);
    assert_eq!(snapshot.large.free_blocks, LARGE_POOL_BLOCKS);
}

#[test]
fn small_pool_exhausts_and_recovers() {
    let allocator = allocator();

    let blocks: Vec<_> = (0..SMALL_POOL_BLOCKS)
        .map(|_| allocator.allocate(1).expect("small pool has room"))
        .collect();
    let distinct: HashSet<_> = blocks.iter().map(|block| block.as_ptr()).collect();
    assert_eq!(distinct.len(), SMALL_POOL_BLOCKS);

    assert_eq!(allocator.allocate(1), None);
    assert!(allocator.snapshot().small.is_exhausted());
    assert_eq!(allocator.snapshot().large.free_blocks, LARGE_POOL_BLOCKS);

    let returned = blocks[SMALL_POOL_BLOCKS / 2];
    unsafe { allocator.release(returned.as_ptr()) };
    assert_eq!(allocator.allocate(1), Some(returned));
}

#[test]
fn oversized_request_leaves_free_lists_untouched() {
    let allocator = allocator();
    let _warm = allocator.allocate(1).expect("fresh small pool");
    let before = allocator.snapshot();

    assert_eq!(allocator.allocate(REQ_LARGE + 1), None);
    assert_eq!(allocator.allocate(usize::MAX), None);

    assert_eq!(allocator.snapshot(), before);
}

#[test]
fn mid_sized_requests_draw_from_the_large_pool() {
    let allocator = allocator();

    let blocks: Vec<_> = (0..LARGE_POOL_BLOCKS)
        .map(|index| {
            let size = REQ_SMALL + 1 + index % (REQ_LARGE - REQ_SMALL);
            allocator.allocate(size).expect("large pool has room")
        })
        .collect();
    assert!(blocks
        .iter()
        .all(|block| allocator.classify(block.as_ptr()) == Some(SizeClass::Large)));

    assert_eq!(allocator.allocate(REQ_SMALL + 1), None);
    assert_eq!(allocator.snapshot().small.free_blocks, SMALL_POOL_BLOCKS);

    release_all(&allocator, &blocks);
    assert!(allocator.snapshot().is_pristine());
}

#[test]
fn foreign_release_is_ignored() {
    let allocator = allocator();
    let _warm = allocator.allocate(1).expect("fresh small pool");
    let before = allocator.snapshot();

    let mut local = 0_u64;
    unsafe {
        allocator.release(ptr::from_mut(&mut local).cast());
        allocator.release(ptr::null_mut());
    }

    assert_eq!(allocator.snapshot(), before);
    assert_eq!(allocator.validate(), Ok(()));
}

#[test]
fn misaligned_release_inside_a_pool_is_ignored() {
    let allocator = allocator();
    let block = allocator.allocate(REQ_LARGE).expect("fresh large pool");
    let before = allocator.snapshot();

    unsafe { allocator.release(block.as_ptr().wrapping_add(BLOCK_BYTES_LARGE / 2)) };

    assert_eq!(allocator.snapshot(), before);
}

#[test]
fn zero_byte_request_uses_the_small_pool() {
    let allocator = allocator();
    let block = allocator.allocate(0).expect("fresh small pool");

    assert_eq!(allocator.classify(block.as_ptr()), Some(SizeClass::Small));
    assert_eq!(allocator.snapshot().small.allocated_blocks(), 1);
}

#[test]
fn released_blocks_come_back_in_lifo_order() {
    let allocator = allocator();
    let blocks: Vec<_> = (0..4).map(|_| allocator.allocate(8).unwrap()).collect();

    release_all(&allocator, &blocks);

    for expected in blocks.iter().rev() {
        assert_eq!(allocator.allocate(8).as_ref(), Some(expected));
    }
}

#[test]
fn blocks_hold_a_full_payload() {
    let allocator = allocator();
    let small = allocator.allocate(REQ_SMALL).unwrap();
    let large = allocator.allocate(REQ_LARGE).unwrap();

    unsafe {
        ptr::write_bytes(small.as_ptr(), 0xAB, BLOCK_BYTES_SMALL);
        ptr::write_bytes(large.as_ptr(), 0xCD, BLOCK_BYTES_LARGE);
        assert_eq!(*small.as_ptr().add(BLOCK_BYTES_SMALL - 1), 0xAB);
        assert_eq!(*large.as_ptr().add(BLOCK_BYTES_LARGE - 1), 0xCD);
    }

    release_all(&allocator, &[small, large]);
    assert_eq!(allocator.validate(), Ok(()));
}

#[test]
fn checked_api_reports_each_refusal() {
    let allocator = allocator();

    assert_eq!(
        unsafe { allocator.try_release(ptr::null_mut()) },
        Err(PoolError::ForeignPointer { addr: 0 })
    );

    let error = allocator.try_allocate(REQ_LARGE + 1).unwrap_err();
    assert_eq!(error.code(), "POOL:ALLOC:UNSUPPORTED");
    assert!(!error.is_retryable());

    let block = allocator.try_allocate(REQ_SMALL).unwrap();
    assert_eq!(
        unsafe { allocator.try_release(block.as_ptr()) },
        Ok(SizeClass::Small)
    );
}
