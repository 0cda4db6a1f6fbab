//! Trap representation.
//!
//! This module provides:
//! 1. **Trap cause codes** matching the RISC-V `scause`/`mcause` encoding for
//!    the faults this core can raise.
//! 2. **`Trap`:** the fault variants the translation core itself can produce.

use std::fmt;

/// Trap cause codes, matching the RISC-V `scause`/`mcause` exception encoding.
///
/// Only the six causes this core can raise are represented; interrupts and
/// the remaining synchronous exceptions belong to the hart execution loop.
pub mod cause {
    /// Instruction access fault (1).
    pub const INSTRUCTION_ACCESS_FAULT: u64 = 1;
    /// Load access fault (5).
    pub const LOAD_ACCESS_FAULT: u64 = 5;
    /// Store/AMO access fault (7).
    pub const STORE_ACCESS_FAULT: u64 = 7;
    /// Instruction page fault (12).
    pub const INSTRUCTION_PAGE_FAULT: u64 = 12;
    /// Load page fault (13).
    pub const LOAD_PAGE_FAULT: u64 = 13;
    /// Store/AMO page fault (15).
    pub const STORE_PAGE_FAULT: u64 = 15;
}

/// A fault raised by the translation core.
///
/// Each variant carries the faulting virtual address (`tval`). The walker
/// and dispatcher produce these; the caller is expected to route them to
/// `TrapSink::raise_trap` with the matching [`cause`] code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// No valid translation, reserved PTE encoding, permission denied,
    /// misaligned superpage, or non-canonical virtual address.
    InstructionPageFault(u64),
    /// See [`Trap::InstructionPageFault`]; raised for data loads.
    LoadPageFault(u64),
    /// See [`Trap::InstructionPageFault`]; raised for data stores.
    StorePageFault(u64),
    /// Translation succeeded but the physical address hits neither RAM nor
    /// any MMIO device, or the MMIO device itself signalled an error.
    InstructionAccessFault(u64),
    /// See [`Trap::InstructionAccessFault`]; raised for data loads.
    LoadAccessFault(u64),
    /// See [`Trap::InstructionAccessFault`]; raised for data stores.
    StoreAccessFault(u64),
}

impl Trap {
    /// The `scause`/`mcause` cause code for this trap.
    #[must_use]
    pub const fn cause(&self) -> u64 {
        match self {
            Self::InstructionPageFault(_) => cause::INSTRUCTION_PAGE_FAULT,
            Self::LoadPageFault(_) => cause::LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => cause::STORE_PAGE_FAULT,
            Self::InstructionAccessFault(_) => cause::INSTRUCTION_ACCESS_FAULT,
            Self::LoadAccessFault(_) => cause::LOAD_ACCESS_FAULT,
            Self::StoreAccessFault(_) => cause::STORE_ACCESS_FAULT,
        }
    }

    /// The faulting virtual address (`tval`).
    #[must_use]
    pub const fn tval(&self) -> u64 {
        match self {
            Self::InstructionPageFault(v)
            | Self::LoadPageFault(v)
            | Self::StorePageFault(v)
            | Self::InstructionAccessFault(v)
            | Self::LoadAccessFault(v)
            | Self::StoreAccessFault(v) => *v,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionPageFault(a) => write!(f, "instruction page fault at {a:#x}"),
            Self::LoadPageFault(a) => write!(f, "load page fault at {a:#x}"),
            Self::StorePageFault(a) => write!(f, "store page fault at {a:#x}"),
            Self::InstructionAccessFault(a) => write!(f, "instruction access fault at {a:#x}"),
            Self::LoadAccessFault(a) => write!(f, "load access fault at {a:#x}"),
            Self::StoreAccessFault(a) => write!(f, "store access fault at {a:#x}"),
        }
    }
}

impl std::error::Error for Trap {}
