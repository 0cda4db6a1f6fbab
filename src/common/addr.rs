//! Physical and virtual address types.
//!
//! Strong wrapper types prevent accidentally mixing the two address spaces
//! at a call site — a walker bug class the teacher crate's raw `u64`
//! addresses don't guard against.

use super::constants::{PAGE_MASK, PAGE_SHIFT};

/// A virtual address, as seen by guest software before translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address, after translation (or identity, in Bare/Machine mode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Wraps a raw 64-bit value.
    #[inline(always)]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// The raw 64-bit value.
    #[inline(always)]
    #[must_use]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// The byte offset within the containing 4 KiB page.
    #[inline(always)]
    #[must_use]
    pub const fn page_offset(self) -> u64 {
        self.0 & PAGE_MASK
    }

    /// The virtual page number: the address with the page offset removed.
    #[inline(always)]
    #[must_use]
    pub const fn vpn(self) -> u64 {
        self.0 >> PAGE_SHIFT
    }
}

impl PhysAddr {
    /// Wraps a raw 64-bit value.
    #[inline(always)]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// The raw 64-bit value.
    #[inline(always)]
    #[must_use]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// The byte offset within the containing 4 KiB page.
    #[inline(always)]
    #[must_use]
    pub const fn page_offset(self) -> u64 {
        self.0 & PAGE_MASK
    }
}
