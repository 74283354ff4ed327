//! Error type for the allocator's fallible operations.
//!
//! Mirrors `slopos_mm::error::MmError`: a plain enum with a hand-written
//! [`core::fmt::Display`] impl, no `thiserror`.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The page source could not supply another page.
    OutOfMemory,
    /// The caller passed a pointer or alignment that fails validation.
    InvalidArgument,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "page source exhausted"),
            Self::InvalidArgument => write!(f, "invalid pointer or alignment"),
        }
    }
}

pub type AllocResult<T = ()> = Result<T, AllocError>;
