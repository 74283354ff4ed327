//! Validation of payload pointers handed back to the allocator by a caller.

use crate::block::BlockRef;
use crate::constants::{MIN_BLOCK_SIZE, ROW_SIZE};
use crate::page_source::PageSource;

/// Checks that `payload` is a pointer this allocator could plausibly have
/// handed out and currently considers allocated, returning its owning
/// block if so.
pub fn check_pointer<P: PageSource>(page_source: &P, payload: *mut u8) -> Option<BlockRef> {
    if payload.is_null() {
        return None;
    }
    if (payload as usize) % ROW_SIZE != 0 {
        return None;
    }

    let heap_start = page_source.mem_start()? as usize;
    let heap_end = page_source.mem_end()? as usize;

    let block_addr = (payload as usize).checked_sub(ROW_SIZE)?;
    if block_addr < heap_start || block_addr > heap_end {
        return None;
    }

    let block = unsafe { BlockRef::from_addr(block_addr as *mut u8) };
    let size = block.size();
    if size < MIN_BLOCK_SIZE || size % ROW_SIZE != 0 {
        return None;
    }

    let end = block_addr + size;
    if end < heap_start || end > heap_end {
        return None;
    }

    if !block.is_allocated() || block.in_quick_list() {
        return None;
    }

    if !block.prev_allocated() {
        let prev_footer = unsafe { (block_addr as *const usize).byte_sub(ROW_SIZE).read() };
        if prev_footer & 0x1 != 0 {
            return None;
        }
    }

    Some(block)
}
