//! External-collaborator seams and the atomic primitives the walker needs.
//!
//! This crate never raises a trap on its own CSR file (it has none) and
//! never invalidates a JIT trace cache (it has none): both are modelled as
//! traits the surrounding emulator implements, generic bounds on
//! [`crate::dispatch::mmu_access`] rather than trait objects, since there is
//! exactly one caller per access.

use crate::common::Trap;

/// Receives traps raised by the translation core.
///
/// The surrounding emulator's trap dispatcher implements this; the core
/// itself never touches `mcause`/`mtval` or any other CSR.
pub trait TrapSink {
    /// Records that `trap` occurred. `cause()`/`tval()` on `trap` give the
    /// cause code and faulting address to write into the guest's trap CSRs.
    fn raise_trap(&mut self, trap: Trap);
}

/// Notifies a JIT or trace cache that a write has changed `[paddr, paddr +
/// size)`, reachable via `vaddr`.
///
/// Default implementation is a no-op, for emulators with no JIT.
pub trait JitInvalidate {
    /// Called after every successful write that lands in RAM.
    fn jit_invalidate(&mut self, vaddr: u64, paddr: u64, size: u64) {
        let _ = (vaddr, paddr, size);
    }
}

/// A `JitInvalidate` that does nothing, for callers with no trace cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJit;

impl JitInvalidate for NoJit {}

/// Atomically compares and swaps a little-endian `u32` at `ptr`.
///
/// Returns `true` if `ptr`'s value equaled `expected` and was replaced with
/// `desired`; `false` otherwise, in which case the write did not happen and
/// the caller is expected to ignore the failure (see the crate's A/D CAS
/// failure policy).
///
/// # Safety
///
/// `ptr` must be valid for atomic reads and writes of 4 bytes, and must be
/// 4-byte aligned.
#[inline]
pub unsafe fn cas32_le(ptr: *mut u8, expected: u32, desired: u32) -> bool {
    let atomic = unsafe { &*ptr.cast::<std::sync::atomic::AtomicU32>() };
    atomic
        .compare_exchange(
            expected.to_le(),
            desired.to_le(),
            std::sync::atomic::Ordering::AcqRel,
            std::sync::atomic::Ordering::Acquire,
        )
        .is_ok()
}

/// Atomically compares and swaps a little-endian `u64` at `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for atomic reads and writes of 8 bytes, and must be
/// 8-byte aligned.
#[inline]
pub unsafe fn cas64_le(ptr: *mut u8, expected: u64, desired: u64) -> bool {
    let atomic = unsafe { &*ptr.cast::<std::sync::atomic::AtomicU64>() };
    atomic
        .compare_exchange(
            expected.to_le(),
            desired.to_le(),
            std::sync::atomic::Ordering::AcqRel,
            std::sync::atomic::Ordering::Acquire,
        )
        .is_ok()
}

/// Loads a little-endian `u32` from `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for a 4-byte read and 4-byte aligned.
#[inline]
#[must_use]
pub unsafe fn load32_le(ptr: *const u8) -> u32 {
    let atomic = unsafe { &*ptr.cast::<std::sync::atomic::AtomicU32>() };
    u32::from_le(atomic.load(std::sync::atomic::Ordering::Acquire))
}

/// Loads a little-endian `u64` from `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for an 8-byte read and 8-byte aligned.
#[inline]
#[must_use]
pub unsafe fn load64_le(ptr: *const u8) -> u64 {
    let atomic = unsafe { &*ptr.cast::<std::sync::atomic::AtomicU64>() };
    u64::from_le(atomic.load(std::sync::atomic::Ordering::Acquire))
}
