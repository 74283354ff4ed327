//! The four public operations, composed from the block-management engine.

use core::cmp::Ordering;
use core::ptr;

use crate::block::{
    BlockRef, calc_block_size, mark_allocated, mark_free, split,
};
use crate::coalesce::{coalesce_with_next, coalesce_with_prev};
use crate::constants::{MIN_BLOCK_SIZE, ROW_SIZE};
use crate::error::AllocError;
use crate::free_list::FreeLists;
use crate::heap;
use crate::page_source::PageSource;
use crate::ptr_check::check_pointer;
use crate::quick_list::QuickLists;

/// A single, independently instantiable allocator. All state a caller
/// would otherwise reach for through process-global statics lives here
/// instead, so tests (and anything else with more than one heap to manage)
/// can hold several of these side by side without interference.
pub struct Allocator<P: PageSource> {
    page_source: P,
    free_lists: FreeLists,
    quick_lists: QuickLists,
    initialized: bool,
    last_error: Option<AllocError>,
}

impl<P: PageSource> Allocator<P> {
    pub fn new(page_source: P) -> Self {
        Self {
            page_source,
            free_lists: FreeLists::new(),
            quick_lists: QuickLists::new(),
            initialized: false,
            last_error: None,
        }
    }

    /// The last error recorded by a failing call. Never cleared on success.
    pub fn last_error(&self) -> Option<AllocError> {
        self.last_error
    }

    pub fn page_source(&self) -> &P {
        &self.page_source
    }

    fn ensure_initialized(&mut self) -> Result<(), AllocError> {
        if self.initialized {
            return Ok(());
        }
        heap::init_heap(&mut self.page_source, &mut self.free_lists)?;
        self.initialized = true;
        Ok(())
    }

    /// Allocates an uninitialized block of at least `size` bytes. Returns
    /// null (without touching the last-error indicator) if `size` is 0.
    pub fn allocate(&mut self, size: usize) -> *mut u8 {
        if size == 0 {
            return ptr::null_mut();
        }
        if let Err(error) = self.ensure_initialized() {
            self.last_error = Some(error);
            return ptr::null_mut();
        }

        let block_size = calc_block_size(size);

        if let Some(block) = self.quick_lists.try_pop(block_size) {
            log::trace!("allocate: quick-list hit for {} bytes", block_size);
            return block.payload_ptr();
        }

        if let Some(block) = self.free_lists.take_fit(block_size) {
            self.finish_allocation(block, block_size);
            log::trace!("allocate: free-list hit for {} bytes", block_size);
            return block.payload_ptr();
        }

        match heap::grow_heap(&mut self.page_source, &mut self.free_lists, block_size) {
            Ok(block) => {
                self.finish_allocation(block, block_size);
                log::debug!("allocate: grew heap for {} bytes", block_size);
                block.payload_ptr()
            }
            Err(error) => {
                self.last_error = Some(error);
                ptr::null_mut()
            }
        }
    }

    /// Splits off and reinserts any excess past `block_size`, then marks
    /// the (possibly shrunk) block allocated.
    fn finish_allocation(&mut self, block: BlockRef, block_size: usize) {
        if let Some(remainder) = split(block, block_size) {
            self.free_lists.insert(remainder);
        }
        mark_allocated(block);
    }

    /// Frees a previously allocated block. Panics if `ptr` fails
    /// validation — a corrupt or foreign pointer here is a caller bug,
    /// not a recoverable condition.
    pub fn free(&mut self, ptr: *mut u8) {
        let Some(block) = check_pointer(&self.page_source, ptr) else {
            panic!("free: invalid pointer {:p}", ptr);
        };
        if self.quick_lists.push(block, &mut self.free_lists) {
            return;
        }
        self.free_to_free_list(block);
    }

    fn free_to_free_list(&mut self, block: BlockRef) {
        let mut block = block;
        if !block.prev_allocated() {
            block = coalesce_with_prev(block, &mut self.free_lists);
        }
        if !block.next_adjacent().is_allocated() {
            block = coalesce_with_next(block, &mut self.free_lists);
        }
        mark_free(block);
        self.free_lists.insert(block);
    }

    /// Resizes a previously allocated block, preserving its contents up to
    /// the smaller of the old and new sizes. `new_size == 0` behaves like
    /// [`Allocator::free`]. An invalid pointer yields null and sets the
    /// last-error indicator rather than panicking, since a bad pointer
    /// here was explicitly passed a size to go with it, unlike `free`.
    pub fn reallocate(&mut self, ptr: *mut u8, new_size: usize) -> *mut u8 {
        let Some(block) = check_pointer(&self.page_source, ptr) else {
            self.last_error = Some(AllocError::InvalidArgument);
            return ptr::null_mut();
        };
        if new_size == 0 {
            self.free(ptr);
            return ptr::null_mut();
        }

        let old_size = block.size();
        let new_block_size = calc_block_size(new_size);

        match new_block_size.cmp(&old_size) {
            Ordering::Greater => {
                let new_ptr = self.allocate(new_size);
                if new_ptr.is_null() {
                    return ptr::null_mut();
                }
                unsafe {
                    ptr::copy_nonoverlapping(ptr, new_ptr, old_size - ROW_SIZE);
                }
                self.free(ptr);
                new_ptr
            }
            Ordering::Less => {
                if let Some(remainder) = split(block, new_block_size) {
                    self.free_to_free_list(remainder);
                }
                ptr
            }
            Ordering::Equal => ptr,
        }
    }

    /// Allocates `size` bytes aligned to `align`, which must be a power of
    /// two of at least [`ROW_SIZE`].
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> *mut u8 {
        if align < ROW_SIZE || !align.is_power_of_two() {
            self.last_error = Some(AllocError::InvalidArgument);
            return ptr::null_mut();
        }
        if size == 0 {
            return ptr::null_mut();
        }

        // Over-allocate enough room that, whichever way the payload lands,
        // there is still space for a minimum-sized leading remainder.
        let raw = self.allocate(size + align + MIN_BLOCK_SIZE + ROW_SIZE);
        if raw.is_null() {
            return ptr::null_mut();
        }
        let block = unsafe { BlockRef::from_payload_ptr(raw) };

        if (raw as usize) % align == 0 {
            let block_size = calc_block_size(size);
            if let Some(remainder) = split(block, block_size) {
                self.free_to_free_list(remainder);
            }
            return raw;
        }

        let candidate = unsafe { block.as_ptr().add(MIN_BLOCK_SIZE + ROW_SIZE) } as usize;
        let aligned = (candidate + align - 1) & !(align - 1);
        let leading_size = aligned - block.addr() - ROW_SIZE;

        let tail = split(block, leading_size)
            .expect("over-allocation guarantees room for the leading remainder");
        mark_allocated(tail);
        // Freeing the leading piece flips `tail`'s prev-allocated bit back
        // off, which is why this must happen after `tail` is marked
        // allocated rather than before.
        self.free_to_free_list(block);

        let block_size = calc_block_size(size);
        if let Some(trailing) = split(tail, block_size) {
            self.free_to_free_list(trailing);
        }

        tail.payload_ptr()
    }
}

#[cfg(test)]
impl<P: PageSource> Allocator<P> {
    /// Free blocks of the given size (`0` for "any size"). Test-only
    /// introspection, grounded on the original test harness's
    /// `assert_free_block_count`.
    pub(crate) fn free_block_count(&self, size: usize) -> usize {
        self.free_lists.count_matching(size)
    }

    pub(crate) fn free_list_class_len(&self, index: usize) -> usize {
        self.free_lists.class_len(index)
    }

    pub(crate) fn quick_block_count(&self, size: usize) -> usize {
        self.quick_lists.count_matching(size)
    }

    pub(crate) fn quick_list_len(&self, index: usize) -> usize {
        self.quick_lists.length(index)
    }

    /// Number of pages the backing page source has handed out so far.
    pub(crate) fn pages_consumed(&self) -> usize {
        match (self.page_source.mem_start(), self.page_source.mem_end()) {
            (Some(start), Some(end)) => {
                (end as usize - start as usize) / crate::constants::PAGE_SIZE
            }
            _ => 0,
        }
    }
}
