//! RISC-V memory translation core.
//!
//! This crate implements the address-translation layer of a RISC-V system
//! emulator, standalone from the hart execution loop it serves:
//! 1. **PAM:** the physical address map — RAM plus a list of MMIO devices.
//! 2. **MMU:** a software TLB and a page-table walker generalized over
//!    Sv32/Sv39/Sv48/Sv57.
//! 3. **MMIO adapter:** widens and splits raw device accesses to fit a
//!    device's supported operation sizes.
//! 4. **Dispatcher:** `mmu_access`, the single entry point the hart loop
//!    calls for every load, store, and instruction fetch.
//!
//! The hart's CSR file, trap dispatcher, JIT/trace cache, and device models
//! are external collaborators, reached only through the [`hooks::TrapSink`]
//! and [`hooks::JitInvalidate`] traits and the [`pam::MmioDevice`] trait.

/// Address types, access classification, page constants, and traps.
pub mod common;

/// Privilege levels, paging modes, and hart translation context.
pub mod arch;

/// Software TLB and page-table walker.
pub mod mmu;

/// Read/write widening and splitting for MMIO devices.
pub mod mmio;

/// The physical address map: RAM and MMIO devices.
pub mod pam;

/// The top-level translation dispatcher.
pub mod dispatch;

/// External-collaborator traits and atomic primitives.
pub mod hooks;

/// Crate configuration.
pub mod config;

pub use arch::{HartContext, PagingLayout, PagingMode, PrivilegeMode};
pub use common::{AccessType, PhysAddr, Trap, VirtAddr};
pub use config::MmuConfig;
pub use dispatch::mmu_access;
pub use hooks::{JitInvalidate, NoJit, TrapSink};
pub use mmu::{Mmu, Resolved};
pub use pam::{ConfigError, MmioDevice, PhysAddrMap, Ram};
