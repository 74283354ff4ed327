//! Boundary-tag coalescing.
//!
//! Both helpers take a standalone block that is not currently linked into
//! any list and return a standalone merged block. Neither touches the
//! quick lists: by the time either is called, the neighbor in question has
//! already been confirmed free (not merely quick-listed), which by the
//! allocator's own invariant means it is resident in exactly one
//! segregated free-list class, so it is always safe to splice out.

use crate::block::{BlockRef, create_block, read_footer_before, size_from_header};
use crate::free_list::FreeLists;

/// Merges `block` with its lower-addressed free neighbor, discovered via
/// the neighbor's footer sitting immediately before `block`'s header.
pub fn coalesce_with_prev(block: BlockRef, free_lists: &mut FreeLists) -> BlockRef {
    let size = block.size();
    let prev_footer = unsafe { read_footer_before(block.as_ptr()) };
    let prev_size = size_from_header(prev_footer);
    let prev_addr = unsafe { block.as_ptr().sub(prev_size) };
    let prev_block = unsafe { BlockRef::from_addr(prev_addr) };

    if prev_block.is_linked() {
        free_lists.remove(prev_block);
    }
    let prev_alloc = prev_block.prev_allocated();

    let merged = unsafe { create_block(prev_addr, size + prev_size) };
    if prev_alloc {
        merged.set_prev_allocated();
    }
    merged
}

/// Merges `block` with its higher-addressed free neighbor.
pub fn coalesce_with_next(block: BlockRef, free_lists: &mut FreeLists) -> BlockRef {
    let size = block.size();
    let next_block = block.next_adjacent();
    let next_size = next_block.size();

    if next_block.is_linked() {
        free_lists.remove(next_block);
    }
    let prev_alloc = block.prev_allocated();

    let merged = unsafe { create_block(block.as_ptr(), size + next_size) };
    if prev_alloc {
        merged.set_prev_allocated();
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::mark_allocated;

    #[test]
    fn coalesce_with_next_merges_sizes_and_preserves_prev_alloc() {
        // [prologue(32, alloc)][a(32)][b(32)][epilogue(0, alloc)]
        let mut buf = [0u8; 32 + 32 + 32 + 8];
        let base = buf.as_mut_ptr();
        let prologue = unsafe { create_block(base, 32) };
        prologue.set_allocated();
        let a = unsafe { create_block(base.add(32), 32) };
        a.set_prev_allocated();
        a.set_allocated();
        let b = unsafe { create_block(base.add(64), 32) };
        let epilogue = unsafe { create_block(base.add(96), 0) };
        epilogue.set_allocated();

        let mut lists = FreeLists::new();
        lists.insert(b);

        let merged = coalesce_with_next(a, &mut lists);
        assert_eq!(merged.size(), 64);
        assert!(merged.prev_allocated());
        assert!(lists.take_fit(64).is_none(), "b must have been spliced out");
        mark_allocated(merged);
    }

    #[test]
    fn coalesce_with_prev_merges_and_reads_prev_alloc_from_predecessor() {
        let mut buf = [0u8; 32 + 32 + 32 + 8];
        let base = buf.as_mut_ptr();
        let prologue = unsafe { create_block(base, 32) };
        prologue.set_allocated();
        let a = unsafe { create_block(base.add(32), 32) };
        a.set_prev_allocated(); // prologue is allocated
        let b = unsafe { create_block(base.add(64), 32) };
        let epilogue = unsafe { create_block(base.add(96), 0) };
        epilogue.set_allocated();

        let mut lists = FreeLists::new();
        lists.insert(a);

        let merged = coalesce_with_prev(b, &mut lists);
        assert_eq!(merged.size(), 64);
        assert!(merged.prev_allocated());
        assert!(lists.take_fit(32).is_none());
    }
}
