//! Crate-level configuration.
//!
//! Parameterizes the translation core's two sizing knobs: the TLB's entry
//! count and the physical address map's RAM window. Deserializable with
//! `serde::Deserialize` so an embedding emulator can supply it from TOML/JSON
//! alongside its own machine description; `MmuConfig::default()` gives a
//! reasonable standalone configuration for tests.

use serde::Deserialize;

use crate::common::PhysAddr;
use crate::mmu::Mmu;
use crate::pam::{ConfigError, PhysAddrMap, Ram};

/// Default configuration constants, mirroring the surrounding crate's own
/// `defaults` module convention.
mod defaults {
    /// Default software TLB entry count (rounded up to a power of two by
    /// [`crate::mmu::Tlb::new`]).
    pub const TLB_ENTRIES: usize = 64;

    /// Default base address of main system RAM (2 GiB).
    pub const RAM_BASE: u64 = 0x8000_0000;

    /// Default size of main system RAM (128 MiB).
    pub const RAM_SIZE: u64 = 128 * 1024 * 1024;
}

/// Configuration for a [`crate::mmu::Mmu`] and its [`crate::pam::PhysAddrMap`].
///
/// MMIO regions are not part of this type: devices carry their own
/// base/size and are registered individually with
/// [`crate::pam::PhysAddrMap::add_mmio`] once constructed, since each device
/// type has its own configuration shape this crate does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MmuConfig {
    /// Software TLB entry count.
    pub tlb_entries: usize,
    /// Physical base address of the RAM region.
    pub ram_base: u64,
    /// Size in bytes of the RAM region.
    pub ram_size: u64,
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            tlb_entries: defaults::TLB_ENTRIES,
            ram_base: defaults::RAM_BASE,
            ram_size: defaults::RAM_SIZE,
        }
    }
}

impl MmuConfig {
    /// Builds the TLB and RAM-backed physical address map this
    /// configuration describes, the way `System::new` builds a machine from
    /// `Config` in the surrounding emulator: a fresh [`Mmu`] sized by
    /// `tlb_entries`, and a [`PhysAddrMap`] whose RAM region spans
    /// `[ram_base, ram_base + ram_size)`. The caller registers any MMIO
    /// devices afterward with [`PhysAddrMap::add_mmio`], since their shapes
    /// are not known to this crate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `ram_base`/`ram_size` is not page-aligned
    /// or the host allocation fails.
    pub fn build(&self) -> Result<(Mmu, PhysAddrMap), ConfigError> {
        let ram = Ram::init(PhysAddr::new(self.ram_base), self.ram_size)?;
        let mmu = Mmu::new(self.tlb_entries);
        let pam = PhysAddrMap::new(Some(ram));
        Ok((mmu, pam))
    }
}
