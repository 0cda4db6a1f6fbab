#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

//! `MmuConfig` integration tests: building an `Mmu`/`PhysAddrMap` pair from
//! configuration, the way an embedding emulator would at machine start.

mod common;

use common::{Fixture, RecordingJit, RecordingTrapSink};
use riscv_mmu_core::{mmu_access, AccessType, MmuConfig, PagingMode, PhysAddr, VirtAddr};

#[test]
fn default_config_builds_a_working_mmu_and_ram() {
    let config = MmuConfig::default();
    let (mut mmu, mut pam) = config.build().expect("default config must build");

    let ram = pam.ram().expect("build() must install the configured RAM");
    assert_eq!(ram.begin(), PhysAddr::new(config.ram_base));
    assert_eq!(ram.size(), config.ram_size);

    // Bare-mode identity access through the freshly built pair proves both
    // halves (Mmu, PhysAddrMap) are actually wired together, not just
    // independently constructed.
    let ctx = Fixture::new().with_mode(PagingMode::Bare).ctx;
    let mut sink = RecordingTrapSink::default();
    let mut jit = RecordingJit::default();
    let mut buf = [0u8; 4];

    let ok = mmu_access(
        &mut mmu,
        &mut pam,
        &ctx,
        VirtAddr::new(config.ram_base + 0x10),
        &mut buf,
        AccessType::Read,
        &mut sink,
        &mut jit,
    );
    assert!(ok);
    assert!(sink.traps.is_empty());
}

#[test]
fn custom_tlb_entries_reach_mmu_new() {
    let config = MmuConfig {
        tlb_entries: 16,
        ram_base: 0x8000_0000,
        ram_size: 0x1000,
    };
    let (mut mmu, mut pam) = config.build().expect("valid config must build");

    // VPN 0 and VPN 16 alias in a 16-slot direct-mapped TLB. If
    // `tlb_entries` reached `Mmu::new` (rather than some unrelated
    // default), filling VPN 16 evicts VPN 0's tag and a translate() for
    // VPN 0 must miss the TLB and fall through to a walk, which faults
    // against this test's unpopulated page table.
    mmu.fill(VirtAddr::new(0), 0, AccessType::Read);
    mmu.fill(VirtAddr::new(16 << 12), 0, AccessType::Read);

    let ctx = Fixture::new().with_root(config.ram_base).ctx;
    let res = mmu.translate(
        &mut pam,
        VirtAddr::new(0),
        AccessType::Read,
        AccessType::Read,
        &ctx,
    );
    assert!(
        res.is_err(),
        "VPN 0's TLB entry must have been evicted by the aliasing fill under a 16-slot TLB"
    );
}

#[test]
fn misaligned_config_fails_to_build() {
    let config = MmuConfig {
        tlb_entries: 64,
        ram_base: 0x1234, // not page-aligned
        ram_size: 0x1000,
    };
    assert!(config.build().is_err());
}
