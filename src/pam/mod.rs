//! Physical address space map.
//!
//! Owns the one RAM region and the list of MMIO devices, and answers
//! "given a physical address, is it RAM, MMIO, or neither?" — the question
//! every translated access and every walker PTE load needs answered.

/// Host-backed guest RAM.
pub mod ram;

/// The MMIO device descriptor trait.
pub mod device;

pub use device::MmioDevice;
pub use ram::{ConfigError, Ram};

use crate::common::PhysAddr;

/// The physical address space: one RAM region plus a list of MMIO devices.
#[derive(Debug, Default)]
pub struct PhysAddrMap {
    ram: Option<Ram>,
    mmio: Vec<Box<dyn MmioDevice>>,
}

impl PhysAddrMap {
    /// Builds a map with the given RAM region (or none, for a walker-only
    /// test harness) and no MMIO devices.
    #[must_use]
    pub fn new(ram: Option<Ram>) -> Self {
        Self {
            ram,
            mmio: Vec::new(),
        }
    }

    /// Registers an MMIO device.
    ///
    /// Devices must not overlap RAM or each other; this is checked with a
    /// `debug_assert!` rather than enforced at runtime, since device
    /// registration happens once at machine construction, not on the hot
    /// path, and the invariant is the caller's to uphold (mirrors
    /// `soc::interconnect::Bus::add_device`'s assumption that devices don't
    /// overlap).
    pub fn add_mmio(&mut self, device: Box<dyn MmioDevice>) {
        let (begin, end) = device.range();
        debug_assert!(
            self.ram.as_ref().is_none_or(|ram| {
                end <= ram.begin().val() || begin >= ram.begin().val() + ram.size()
            }),
            "MMIO device {:?} overlaps RAM",
            device.name()
        );
        debug_assert!(
            self.mmio.iter().all(|other| {
                let (ob, oe) = other.range();
                end <= ob || begin >= oe
            }),
            "MMIO device {:?} overlaps another MMIO region",
            device.name()
        );
        self.mmio.push(device);
    }

    /// Returns a host pointer for physical address `p` if it falls within
    /// the RAM region. Constant time.
    #[must_use]
    pub fn phys_to_host(&self, p: PhysAddr) -> Option<*const u8> {
        self.ram.as_ref().and_then(|ram| ram.phys_to_host(p))
    }

    /// Mutable counterpart of [`PhysAddrMap::phys_to_host`].
    #[must_use]
    pub fn phys_to_host_mut(&mut self, p: PhysAddr) -> Option<*mut u8> {
        self.ram.as_mut().and_then(|ram| ram.phys_to_host_mut(p))
    }

    /// Returns the first MMIO device containing physical address `p`, if
    /// any. Linear scan, matching the spec's stated device-list size (a
    /// handful of devices per machine, not a hot-path concern).
    #[must_use]
    pub fn find_mmio(&mut self, p: PhysAddr) -> Option<&mut dyn MmioDevice> {
        self.mmio
            .iter_mut()
            .find(|dev| dev.contains(p.val()))
            .map(Box::as_mut)
    }

    /// The RAM region, if configured.
    #[must_use]
    pub const fn ram(&self) -> Option<&Ram> {
        self.ram.as_ref()
    }
}
