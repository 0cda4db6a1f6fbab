//! The hart-visible CSR slice the translation core reads.
//!
//! The surrounding emulator owns the full CSR file; this core only ever
//! reads `satp`, `status.{MPRV,MXR,MPP}`, and the current privilege mode.
//! `HartContext` is that slice, standing in for the teacher crate's much
//! larger `Csrs` struct.

use super::mode::{PagingMode, PrivilegeMode};
use crate::common::PhysAddr;

/// Bit position of `satp.MODE` in a 64-bit `satp` (Sv39/48/57).
pub const SATP64_MODE_SHIFT: u32 = 60;
/// Mask of `satp.MODE` in a 64-bit `satp`.
pub const SATP64_MODE_MASK: u64 = 0xF;
/// Mask of `satp.PPN` in a 64-bit `satp`.
pub const SATP64_PPN_MASK: u64 = 0x0FFF_FFFF_FFFF;
/// Bit position of `satp.MODE` in a 32-bit `satp` (Sv32).
pub const SATP32_MODE_SHIFT: u32 = 31;
/// Mask of `satp.PPN` in a 32-bit `satp`.
pub const SATP32_PPN_MASK: u32 = 0x003F_FFFF;

/// Bit position of `status.MPP`.
pub const MSTATUS_MPP_SHIFT: u64 = 11;
/// Mask of `status.MPP` once shifted down.
pub const MSTATUS_MPP_MASK: u64 = 0b11;
/// `status.SUM` bit.
pub const MSTATUS_SUM: u64 = 1 << 18;
/// `status.MXR` bit.
pub const MSTATUS_MXR: u64 = 1 << 19;
/// `status.MPRV` bit.
pub const MSTATUS_MPRV: u64 = 1 << 17;

/// The per-hart state this core reads. Constructed by the surrounding
/// emulator from its own CSR file.
#[derive(Clone, Copy, Debug)]
pub struct HartContext {
    /// Current privilege mode.
    pub priv_mode: PrivilegeMode,
    /// Active paging mode, decoded from `satp.MODE`.
    pub mmu_mode: PagingMode,
    /// Root page-table physical address, decoded from `satp.PPN`.
    pub root_page_table: PhysAddr,
    /// `status.MPRV`: blend in `MPP` as the effective privilege for
    /// non-fetch accesses.
    pub mprv: bool,
    /// `status.MXR`: allow reads to satisfy execute-only pages.
    pub mxr: bool,
    /// `status.SUM`: allow supervisor access to user pages.
    pub sum: bool,
    /// `status.MPP`: the privilege `MPRV` blends in.
    pub mpp: PrivilegeMode,
}

impl HartContext {
    /// The effective privilege mode for an access of the given kind.
    ///
    /// Implements the dispatcher's privilege-blending rule: `MPRV` only
    /// applies to non-fetch accesses, fetches always use `priv_mode`.
    #[must_use]
    pub fn effective_privilege(&self, is_fetch: bool) -> PrivilegeMode {
        if self.mprv && !is_fetch {
            self.mpp
        } else {
            self.priv_mode
        }
    }
}
