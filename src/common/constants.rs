//! Page-size and address-field constants shared across the translation core.

/// Page size in bytes (4 KiB) in every paging mode this core supports.
pub const PAGE_SIZE: u64 = 4096;

/// `log2(PAGE_SIZE)` — number of bits of page offset.
pub const PAGE_SHIFT: u64 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_MASK: u64 = PAGE_SIZE - 1;
