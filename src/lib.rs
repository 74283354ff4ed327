//! A segregated free-list dynamic memory allocator with quick-list caching,
//! deferred coalescing, and boundary-tag metadata.
//!
//! The block-management engine ([`block`], [`free_list`], [`quick_list`],
//! [`coalesce`], [`heap`]) is pure computation over a caller-owned backing
//! region; it is generic over a [`page_source::PageSource`] that supplies
//! that region one fixed-size page at a time. [`allocator::Allocator`]
//! composes those pieces into the four public operations. [`global`] wraps
//! one lazily-initialized, mutex-guarded instance for callers that want
//! free-function or `#[global_allocator]` ergonomics instead of an explicit
//! handle.

#![no_std]

extern crate alloc;

pub mod allocator;
pub mod block;
pub mod coalesce;
pub mod constants;
pub mod error;
pub mod free_list;
pub mod global;
pub mod heap;
pub mod page_source;
pub mod ptr_check;
pub mod quick_list;

pub use allocator::Allocator;
pub use error::{AllocError, AllocResult};
pub use global::GlobalSegregatedAllocator;
pub use page_source::{PageSource, SimulatedPageSource};

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod scenarios;
