//! A process-wide convenience surface over a single lazily-initialized,
//! mutex-guarded [`Allocator`], for callers that want free-function
//! ergonomics rather than an explicit handle — the same shape as
//! `kernel_heap`'s `static KERNEL_HEAP: IrqMutex<KernelHeap>` plus its
//! `kmalloc`/`kfree` wrappers.

use core::alloc::{GlobalAlloc, Layout};

use spin::Mutex;

use crate::allocator::Allocator;
use crate::constants::ROW_SIZE;
use crate::error::AllocError;
use crate::page_source::SimulatedPageSource;

static GLOBAL_ALLOCATOR: Mutex<Option<Allocator<SimulatedPageSource>>> = Mutex::new(None);

fn with_global<R>(f: impl FnOnce(&mut Allocator<SimulatedPageSource>) -> R) -> R {
    let mut guard = GLOBAL_ALLOCATOR.lock();
    let allocator = guard.get_or_insert_with(|| Allocator::new(SimulatedPageSource::new()));
    f(allocator)
}

pub fn allocate(size: usize) -> *mut u8 {
    with_global(|a| a.allocate(size))
}

pub fn deallocate(ptr: *mut u8) {
    with_global(|a| a.free(ptr))
}

pub fn reallocate(ptr: *mut u8, size: usize) -> *mut u8 {
    with_global(|a| a.reallocate(ptr, size))
}

pub fn allocate_aligned(size: usize, align: usize) -> *mut u8 {
    with_global(|a| a.allocate_aligned(size, align))
}

pub fn last_error() -> Option<AllocError> {
    with_global(|a| a.last_error())
}

/// Drop-in [`GlobalAlloc`] over the process-wide allocator, the same role
/// `KernelAllocator` plays over `kernel_heap`. Alignment requests beyond a
/// single row are routed through [`allocate_aligned`] rather than a
/// separate bookkeeping scheme, since its returned pointer is already a
/// fully valid block payload pointer that `free` can reclaim directly.
pub struct GlobalSegregatedAllocator;

impl GlobalSegregatedAllocator {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for GlobalSegregatedAllocator {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl GlobalAlloc for GlobalSegregatedAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() <= ROW_SIZE {
            allocate(layout.size())
        } else {
            allocate_aligned(layout.size(), layout.align())
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        deallocate(ptr)
    }
}
