//! MMIO device descriptor.
//!
//! A device occupies a physical address range `[begin, end)` and declares
//! the access-size window it natively supports; the [`crate::mmio`] adapter
//! widens or splits accesses outside that window before calling in here.

use std::fmt;

/// A memory-mapped I/O device attached to the physical address map.
///
/// `min_op_size` and `max_op_size` are both powers of two with
/// `min_op_size <= max_op_size <= 16`.
pub trait MmioDevice {
    /// A short name for diagnostics (not used for routing).
    fn name(&self) -> &str;

    /// Inclusive-exclusive physical address range `[begin, end)`.
    fn range(&self) -> (u64, u64);

    /// Smallest access size this device accepts natively.
    fn min_op_size(&self) -> u32;

    /// Largest access size this device accepts natively.
    fn max_op_size(&self) -> u32;

    /// Reads `size` bytes at device-relative `offset` into `dst`.
    ///
    /// The adapter guarantees `size <= max_op_size`. When the call lands on
    /// its fast path (no widening needed), it additionally guarantees
    /// `size >= min_op_size` with `offset` aligned to `min_op_size` — but
    /// `size` itself is not guaranteed to be a power of two, since a
    /// page-crossing split can hand the adapter an odd-sized remainder that
    /// already satisfies both bounds. A widened read-modify-write call is
    /// always `min_op_size`-aligned and sized exactly `min_op_size` or a
    /// power-of-two multiple of it.
    fn read(&mut self, dst: &mut [u8], size: u32, offset: u64);

    /// Writes `size` bytes from `src` at device-relative `offset`.
    ///
    /// Same size/alignment guarantees as [`MmioDevice::read`].
    fn write(&mut self, src: &[u8], size: u32, offset: u64);

    /// Whether physical address `p` falls within this device's range.
    fn contains(&self, p: u64) -> bool {
        let (begin, end) = self.range();
        p >= begin && p < end
    }
}

impl fmt::Debug for dyn MmioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (begin, end) = self.range();
        f.debug_struct("MmioDevice")
            .field("name", &self.name())
            .field("range", &(begin, end))
            .finish()
    }
}
