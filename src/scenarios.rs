//! End-to-end scenarios exercising the public operations together, each one
//! mirroring a concrete walkthrough from the allocator's design notes rather
//! than a single primitive in isolation.

use crate::allocator::Allocator;
use crate::error::AllocError;
use crate::page_source::SimulatedPageSource;

fn fresh() -> Allocator<SimulatedPageSource> {
    Allocator::new(SimulatedPageSource::new())
}

#[test]
fn int_allocation_sanity() {
    let mut a = fresh();
    let p = a.allocate(4);
    assert!(!p.is_null());

    assert_eq!(a.free_block_count(4024), 1);
    assert_eq!(a.free_list_class_len(7), 1);
    assert_eq!(a.quick_block_count(0), 0);
    assert_eq!(a.last_error(), None);
    assert_eq!(a.pages_consumed(), 1);
}

#[test]
fn multi_page_allocation() {
    let mut a = fresh();
    let p = a.allocate(16336);
    assert!(!p.is_null());
    assert_eq!(a.free_block_count(0), 0);
    assert_eq!(a.pages_consumed(), 4);
}

#[test]
fn quick_list_round_trip() {
    let mut a = fresh();
    a.allocate(8);
    let middle = a.allocate(32);
    a.allocate(1);

    a.free(middle);

    assert_eq!(a.quick_block_count(40), 1);
    assert_eq!(a.free_block_count(3952), 1);
}

#[test]
fn coalesce_across_frees() {
    let mut a = fresh();
    a.allocate(8);
    let x = a.allocate(200);
    let y = a.allocate(300);
    a.allocate(4);

    a.free(y);
    a.free(x);

    assert_eq!(a.quick_block_count(0), 0);
    assert_eq!(a.free_block_count(0), 2);
    assert_eq!(a.free_block_count(520), 1);
    assert_eq!(a.free_block_count(3472), 1);
}

#[test]
fn quick_list_flush() {
    let mut a = fresh();
    let ptrs: std::vec::Vec<*mut u8> = (0..6).map(|_| a.allocate(24)).collect();
    for &p in &ptrs[..5] {
        a.free(p);
    }

    assert_eq!(a.quick_block_count(32), 5);
    assert_eq!(a.free_block_count(0), 1);

    // The sixth free overflows the class and forces a flush.
    a.free(ptrs[5]);

    assert_eq!(a.quick_list_len(0), 1);
    assert_eq!(a.free_block_count(0), 2);

    // Popping the survivor back out doesn't disturb the free lists.
    let reused = a.allocate(24);
    assert!(!reused.is_null());
    assert_eq!(a.quick_block_count(32), 0);
    assert_eq!(a.free_block_count(0), 2);
}

#[test]
fn alignment_1024() {
    let mut a = fresh();
    let p = a.allocate_aligned(1024, 1024);
    assert!(!p.is_null());
    assert_eq!((p as usize) % 1024, 0);
    assert_eq!(a.free_block_count(0), 2);

    a.free(p);
    assert_eq!(a.free_block_count(0), 1);
}

#[test]
fn invalid_alignment_request() {
    let mut a = fresh();
    let p = a.allocate_aligned(1024, 9);
    assert!(p.is_null());
    assert_eq!(a.last_error(), Some(AllocError::InvalidArgument));
}

#[test]
#[should_panic]
fn free_of_null_terminates_abnormally() {
    let mut a = fresh();
    a.free(core::ptr::null_mut());
}
