//! Host-backed guest RAM.
//!
//! `Ram` owns one contiguous, zero-initialized, page-aligned region of host
//! memory that backs a range of guest physical addresses. It is mmap-backed
//! on Unix (matching the teacher crate's `DramBuffer`), falling back to a
//! heap `Vec` elsewhere, and is torn down by `Drop` rather than an explicit
//! `ram_free` call.

use std::fmt;
use std::ptr::NonNull;

use thiserror::Error;

use crate::common::{PhysAddr, PAGE_SIZE};

/// Failure constructing a crate-owned resource at configuration time.
///
/// These are fatal to machine start; the caller is expected to abort rather
/// than attempt to recover a partially configured machine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `begin` or `size` was not a multiple of the page size.
    #[error("RAM region [{begin:#x}, +{size:#x}) is not page-aligned")]
    RamMisaligned {
        /// The requested base physical address.
        begin: u64,
        /// The requested size in bytes.
        size: u64,
    },
    /// The host could not allocate the requested backing storage.
    #[error("failed to allocate {size} bytes of guest RAM")]
    RamAllocationFailed {
        /// The requested size in bytes.
        size: u64,
    },
}

enum Backing {
    #[cfg(unix)]
    Mmap(NonNull<u8>, usize),
    Heap(Vec<u8>),
}

// SAFETY: the mmap region and the Vec's heap allocation are both exclusively
// owned by this `Ram` and never aliased outside of it; `Ram` itself is
// moved, not shared, across threads without synchronization external to
// this crate (the surrounding emulator is responsible for any cross-hart
// access discipline, per the concurrency model).
unsafe impl Send for Backing {}
unsafe impl Sync for Backing {}

/// A contiguous, zero-initialized region of guest physical RAM.
pub struct Ram {
    begin: PhysAddr,
    size: u64,
    backing: Backing,
}

impl fmt::Debug for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ram")
            .field("begin", &self.begin)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Ram {
    /// Allocates a new RAM region `[begin, begin + size)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RamMisaligned`] if `begin` or `size` is not a
    /// multiple of the page size, or [`ConfigError::RamAllocationFailed`] if
    /// the host allocation fails.
    pub fn init(begin: PhysAddr, size: u64) -> Result<Self, ConfigError> {
        if begin.val() % PAGE_SIZE != 0 || size % PAGE_SIZE != 0 || size == 0 {
            return Err(ConfigError::RamMisaligned {
                begin: begin.val(),
                size,
            });
        }

        #[cfg(unix)]
        {
            // SAFETY: `size` is nonzero and we check the return value below;
            // MAP_ANONYMOUS | MAP_PRIVATE gives us a zero-initialized,
            // process-private region, so no fd handling is needed.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size as usize,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(ConfigError::RamAllocationFailed { size });
            }
            let ptr =
                NonNull::new(ptr.cast::<u8>()).ok_or(ConfigError::RamAllocationFailed { size })?;
            return Ok(Self {
                begin,
                size,
                backing: Backing::Mmap(ptr, size as usize),
            });
        }

        #[cfg(not(unix))]
        {
            let buf = vec![0u8; size as usize];
            Ok(Self {
                begin,
                size,
                backing: Backing::Heap(buf),
            })
        }
    }

    /// The base physical address of this region.
    #[must_use]
    pub const fn begin(&self) -> PhysAddr {
        self.begin
    }

    /// The size of this region in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns `true` if physical address `p` lies within this region.
    #[must_use]
    pub const fn contains(&self, p: PhysAddr) -> bool {
        p.val() >= self.begin.val() && p.val() < self.begin.val() + self.size
    }

    fn as_ptr(&self) -> *const u8 {
        match &self.backing {
            #[cfg(unix)]
            Backing::Mmap(ptr, _) => ptr.as_ptr(),
            Backing::Heap(buf) => buf.as_ptr(),
        }
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        match &mut self.backing {
            #[cfg(unix)]
            Backing::Mmap(ptr, _) => ptr.as_ptr(),
            Backing::Heap(buf) => buf.as_mut_ptr(),
        }
    }

    /// Returns a host pointer to physical address `p`, or `None` if `p` is
    /// outside this region. Constant time.
    #[must_use]
    pub fn phys_to_host(&self, p: PhysAddr) -> Option<*const u8> {
        self.contains(p)
            .then(|| unsafe { self.as_ptr().add((p.val() - self.begin.val()) as usize) })
    }

    /// Mutable counterpart of [`Ram::phys_to_host`].
    #[must_use]
    pub fn phys_to_host_mut(&mut self, p: PhysAddr) -> Option<*mut u8> {
        if !self.contains(p) {
            return None;
        }
        let offset = (p.val() - self.begin.val()) as usize;
        // SAFETY: `offset < self.size` was just checked by `contains`.
        Some(unsafe { self.as_mut_ptr().add(offset) })
    }

    /// Copies `data` into the region at byte offset `offset`, for initial
    /// image loading. Out-of-range writes are silently truncated to fit.
    pub fn load(&mut self, offset: usize, data: &[u8]) {
        let cap = self.size as usize;
        if offset >= cap {
            return;
        }
        let len = data.len().min(cap - offset);
        // SAFETY: `offset + len <= self.size`, so this stays within the
        // backing allocation.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.as_mut_ptr().add(offset), len);
        }
    }
}

impl Drop for Ram {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Backing::Mmap(ptr, len) = &self.backing {
            // SAFETY: `ptr`/`len` are exactly what `mmap` returned in `init`
            // and this is the only place that unmaps them.
            unsafe {
                libc::munmap(ptr.as_ptr().cast(), *len);
            }
        }
    }
}
