//! The heap-growth state machine: first-use initialization and on-demand
//! growth, both built on top of a [`PageSource`].

use crate::block::{BlockRef, create_block};
use crate::coalesce::coalesce_with_prev;
use crate::constants::{MIN_BLOCK_SIZE, ROW_SIZE};
use crate::error::{AllocError, AllocResult};
use crate::free_list::FreeLists;
use crate::page_source::PageSource;

/// Acquires the first page, lays down the prologue and epilogue sentinels,
/// and inserts the remainder of that page as the heap's first free block.
pub fn init_heap<P: PageSource>(page_source: &mut P, free_lists: &mut FreeLists) -> AllocResult<()> {
    let page = page_source.mem_grow().ok_or(AllocError::OutOfMemory)?;
    let page_end = page_source
        .mem_end()
        .expect("page source reported a grow but no end");

    let prologue = unsafe { create_block(page, MIN_BLOCK_SIZE) };
    prologue.set_allocated();

    let epilogue = unsafe { create_block(page_end.sub(ROW_SIZE), 0) };
    epilogue.set_allocated();

    let free_size = page_end as usize - page as usize - MIN_BLOCK_SIZE - ROW_SIZE;
    let free_block = unsafe { create_block(page.add(MIN_BLOCK_SIZE), free_size) };
    free_block.set_prev_allocated();
    free_lists.insert(free_block);

    log::debug!(
        "heap initialized at {:#x}, {} bytes in first free block",
        page as usize,
        free_size
    );
    Ok(())
}

/// Grows the heap by one or more pages until the accumulated tail block is
/// at least `needed` bytes, coalescing each newly added page with the
/// existing tail as it goes. On exhaustion, any block accumulated so far
/// is recovered into the free lists before the error is returned.
pub fn grow_heap<P: PageSource>(
    page_source: &mut P,
    free_lists: &mut FreeLists,
    needed: usize,
) -> AllocResult<BlockRef> {
    let mut accumulated: Option<BlockRef> = None;

    loop {
        let page = match page_source.mem_grow() {
            Some(page) => page,
            None => {
                if let Some(block) = accumulated {
                    block.sync_footer();
                    free_lists.insert(block);
                }
                log::warn!("heap growth failed: page source exhausted");
                return Err(AllocError::OutOfMemory);
            }
        };
        let page_end = page_source
            .mem_end()
            .expect("page source reported a grow but no end");

        // The old epilogue sat exactly where the new page begins, one row
        // earlier; every grow iteration reuses its address as the new
        // accumulated block's header.
        let old_epilogue = unsafe { BlockRef::from_addr(page.sub(ROW_SIZE)) };
        let prev_alloc = old_epilogue.prev_allocated();

        let new_epilogue = unsafe { create_block(page_end.sub(ROW_SIZE), 0) };
        new_epilogue.set_allocated();

        let size = page_end as usize - page as usize;
        let mut grown = unsafe { create_block(old_epilogue.as_ptr(), size) };
        if prev_alloc {
            grown.set_prev_allocated();
        } else {
            grown = coalesce_with_prev(grown, free_lists);
        }

        let satisfied = grown.size() >= needed;
        accumulated = Some(grown);
        if satisfied {
            break;
        }
    }

    log::debug!("heap grew to satisfy a {}-byte request", needed);
    Ok(accumulated.expect("loop only exits after assigning accumulated"))
}
