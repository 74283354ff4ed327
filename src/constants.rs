//! Tunables for the block-management engine.
//!
//! Centralized the way `mm_constants` centralizes paging tunables, except
//! here the values are fixed by the allocator's own invariants rather than
//! re-exported from an ABI crate: there is nothing to configure at runtime.

/// Size of a page returned by a [`crate::page_source::PageSource`].
pub const PAGE_SIZE: usize = 4096;

/// Width of a header, footer, or link slot.
pub const ROW_SIZE: usize = 8;

/// Smallest legal block size: one header/footer row plus two link rows.
pub const MIN_BLOCK_SIZE: usize = 32;

/// Number of segregated free-list size classes.
pub const NUM_FREE_LISTS: usize = 10;

/// Number of quick-list size classes.
pub const NUM_QUICK_LISTS: usize = 20;

/// Maximum resident blocks per quick list before a flush is forced.
pub const QUICK_LIST_CAPACITY: usize = 5;
