#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

//! Physical address map tests: RAM/void/MMIO routing.

mod common;

use common::MockDevice;
use riscv_mmu_core::{PhysAddr, PhysAddrMap, Ram};

#[test]
fn phys_to_host_hits_within_ram_and_misses_outside() {
    let ram = Ram::init(PhysAddr::new(0x8000_0000), 0x1000).unwrap();
    let pam = PhysAddrMap::new(Some(ram));

    assert!(pam.phys_to_host(PhysAddr::new(0x8000_0000)).is_some());
    assert!(pam.phys_to_host(PhysAddr::new(0x8000_0FFF)).is_some());
    assert!(pam.phys_to_host(PhysAddr::new(0x8000_1000)).is_none());
    assert!(pam.phys_to_host(PhysAddr::new(0x7FFF_FFFF)).is_none());
}

#[test]
fn find_mmio_returns_the_containing_device() {
    let mut pam = PhysAddrMap::new(None);
    pam.add_mmio(Box::new(MockDevice::new("uart", 0x1000, 0x100, 1, 4)));
    pam.add_mmio(Box::new(MockDevice::new("plic", 0x2000, 0x1000, 4, 4)));

    assert_eq!(pam.find_mmio(PhysAddr::new(0x1050)).unwrap().name(), "uart");
    assert_eq!(pam.find_mmio(PhysAddr::new(0x2500)).unwrap().name(), "plic");
    assert!(pam.find_mmio(PhysAddr::new(0x3000)).is_none());
}

#[test]
fn ram_init_rejects_misaligned_region() {
    assert!(Ram::init(PhysAddr::new(0x1), 0x1000).is_err());
    assert!(Ram::init(PhysAddr::new(0x1000), 0x1).is_err());
}

#[test]
fn ram_is_zero_initialized() {
    let mut ram = Ram::init(PhysAddr::new(0x8000_0000), 0x1000).unwrap();
    let host = ram.phys_to_host_mut(PhysAddr::new(0x8000_0000)).unwrap();
    let byte = unsafe { *host };
    assert_eq!(byte, 0);
}

#[test]
fn ram_load_writes_image_bytes() {
    let mut ram = Ram::init(PhysAddr::new(0x8000_0000), 0x1000).unwrap();
    ram.load(0x10, &[1, 2, 3, 4]);

    let host = ram.phys_to_host_mut(PhysAddr::new(0x8000_0010)).unwrap();
    let bytes = unsafe { std::slice::from_raw_parts(host, 4) };
    assert_eq!(bytes, [1, 2, 3, 4]);
}
