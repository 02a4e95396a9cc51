//! Process-wide instance
//!
//! Everything lives in one test: the instance is shared by the whole test
//! binary and its functions must not run concurrently.

use segpool::{EngineState, LARGE_POOL_BLOCKS, REQ_LARGE, SMALL_POOL_BLOCKS, SizeClass, global};

#[test]
fn process_wide_lifecycle() {
    unsafe {
        let fresh = global::snapshot();
        assert_eq!(fresh.state, EngineState::Uninitialized);
        assert_eq!(fresh.small.free_blocks, 0);

        // Release before the first allocation is a no-op and does not
        // initialize the pools.
        let mut local = 0_usize;
        global::release(std::ptr::from_mut(&mut local).cast());
        assert_eq!(global::snapshot().state, EngineState::Uninitialized);

        let small = global::allocate(15).expect("fresh small pool");
        let large = global::allocate(REQ_LARGE).expect("fresh large pool");
        assert_eq!(global::snapshot().state, EngineState::Ready);
        assert_eq!(global::snapshot().small.free_blocks, SMALL_POOL_BLOCKS - 1);
        assert_eq!(global::snapshot().large.free_blocks, LARGE_POOL_BLOCKS - 1);

        global::release(small.as_ptr());
        assert_eq!(global::try_release(large.as_ptr()), Ok(SizeClass::Large));
        assert!(global::snapshot().is_pristine());
        assert_eq!(global::validate(), Ok(()));

        assert_eq!(global::allocate(15), Some(small));
        assert_eq!(global::try_allocate(REQ_LARGE + 1).unwrap_err().code(), "POOL:ALLOC:UNSUPPORTED");
        global::release(small.as_ptr());

        #[cfg(feature = "debug-probe")]
        global::debug_print();

        assert!(global::snapshot().is_pristine());
    }
}
