//! Shared test harness for the integration suite.
//!
//! Mirrors the teacher crate's `tests/common` module: a small fixture
//! builder plus mock collaborators for the traits this crate exposes at
//! its boundary (`TrapSink`, `MmioDevice`).

use riscv_mmu_core::{HartContext, PagingMode, PhysAddr, PhysAddrMap, PrivilegeMode, Ram, Trap};

/// Physical base of the fixture RAM region, matching the teacher crate's
/// conventional guest load address.
pub const MEM_BASE: u64 = 0x8000_0000;
/// Size of the fixture RAM region (16 MiB, comfortably larger than any
/// multi-level page table a test builds).
pub const MEM_SIZE: u64 = 16 * 1024 * 1024;

/// PTE permission/status bits, named the way the spec names them.
pub const V: u64 = 1 << 0;
pub const R: u64 = 1 << 1;
pub const W: u64 = 1 << 2;
pub const X: u64 = 1 << 3;
pub const U: u64 = 1 << 4;
pub const G: u64 = 1 << 5;
pub const A: u64 = 1 << 6;
pub const D: u64 = 1 << 7;

/// A minimal fixture: one RAM-backed `PhysAddrMap` plus a `HartContext`
/// defaulted to Supervisor/Sv39 with no privilege blending, the way most
/// walker and dispatcher tests want to start.
pub struct Fixture {
    pub pam: PhysAddrMap,
    pub ctx: HartContext,
}

impl Fixture {
    pub fn new() -> Self {
        let ram = Ram::init(PhysAddr::new(MEM_BASE), MEM_SIZE).expect("ram init");
        let pam = PhysAddrMap::new(Some(ram));
        let ctx = HartContext {
            priv_mode: PrivilegeMode::Supervisor,
            mmu_mode: PagingMode::Sv39,
            root_page_table: PhysAddr::new(MEM_BASE),
            mprv: false,
            mxr: false,
            sum: false,
            mpp: PrivilegeMode::User,
        };
        Self { pam, ctx }
    }

    pub fn with_mode(mut self, mode: PagingMode) -> Self {
        self.ctx.mmu_mode = mode;
        self
    }

    pub fn with_root(mut self, root: u64) -> Self {
        self.ctx.root_page_table = PhysAddr::new(root);
        self
    }

    /// Writes a little-endian PTE of `pte_bytes` width at physical address
    /// `table_base + index * pte_bytes`.
    pub fn write_pte(&mut self, table_base: u64, index: u64, pte_bytes: u64, value: u64) {
        let addr = PhysAddr::new(table_base + index * pte_bytes);
        let host = self.pam.phys_to_host_mut(addr).expect("pte addr in RAM");
        unsafe {
            if pte_bytes == 4 {
                std::ptr::write_unaligned(host.cast::<u32>(), (value as u32).to_le());
            } else {
                std::ptr::write_unaligned(host.cast::<u64>(), value.to_le());
            }
        }
    }

    /// Reads back a PTE previously written with [`Fixture::write_pte`].
    pub fn read_pte(&mut self, table_base: u64, index: u64, pte_bytes: u64) -> u64 {
        let addr = PhysAddr::new(table_base + index * pte_bytes);
        let host = self.pam.phys_to_host_mut(addr).expect("pte addr in RAM");
        unsafe {
            if pte_bytes == 4 {
                u64::from(u32::from_le(std::ptr::read_unaligned(host.cast::<u32>())))
            } else {
                u64::from_le(std::ptr::read_unaligned(host.cast::<u64>()))
            }
        }
    }

    /// Writes raw bytes directly into RAM at a physical address, for
    /// seeding leaf-page contents ahead of a translated access.
    pub fn write_bytes(&mut self, paddr: u64, data: &[u8]) {
        let host = self
            .pam
            .phys_to_host_mut(PhysAddr::new(paddr))
            .expect("paddr in RAM");
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), host, data.len());
        }
    }
}

/// Builds a PTE: `(ppn << 10) | perms | V`.
pub fn make_pte(ppn: u64, perms: u64) -> u64 {
    (ppn << 10) | perms | V
}

/// A `TrapSink` that records every trap raised, for assertion.
#[derive(Default)]
pub struct RecordingTrapSink {
    pub traps: Vec<Trap>,
}

impl riscv_mmu_core::TrapSink for RecordingTrapSink {
    fn raise_trap(&mut self, trap: Trap) {
        self.traps.push(trap);
    }
}

impl RecordingTrapSink {
    pub fn last(&self) -> Option<Trap> {
        self.traps.last().copied()
    }
}

/// A `JitInvalidate` that records every invalidation request, for
/// assertion, instead of discarding them like [`riscv_mmu_core::NoJit`].
#[derive(Default)]
pub struct RecordingJit {
    pub calls: Vec<(u64, u64, u64)>,
}

impl riscv_mmu_core::JitInvalidate for RecordingJit {
    fn jit_invalidate(&mut self, vaddr: u64, paddr: u64, size: u64) {
        self.calls.push((vaddr, paddr, size));
    }
}

/// A trivial byte-addressable MMIO device for adapter and dispatcher
/// tests: `max - min` bytes of backing storage, tracking every
/// `(offset, size)` pair it was called with so widening/splitting can be
/// asserted against.
pub struct MockDevice {
    name: &'static str,
    begin: u64,
    end: u64,
    min_op_size: u32,
    max_op_size: u32,
    storage: Vec<u8>,
    pub reads: Vec<(u64, u32)>,
    pub writes: Vec<(u64, u32)>,
}

impl MockDevice {
    pub fn new(name: &'static str, begin: u64, len: u64, min_op_size: u32, max_op_size: u32) -> Self {
        Self {
            name,
            begin,
            end: begin + len,
            min_op_size,
            max_op_size,
            storage: vec![0u8; len as usize],
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn seed(&mut self, offset: u64, data: &[u8]) {
        self.storage[offset as usize..offset as usize + data.len()].copy_from_slice(data);
    }
}

impl riscv_mmu_core::MmioDevice for MockDevice {
    fn name(&self) -> &str {
        self.name
    }

    fn range(&self) -> (u64, u64) {
        (self.begin, self.end)
    }

    fn min_op_size(&self) -> u32 {
        self.min_op_size
    }

    fn max_op_size(&self) -> u32 {
        self.max_op_size
    }

    fn read(&mut self, dst: &mut [u8], size: u32, offset: u64) {
        self.reads.push((offset, size));
        dst.copy_from_slice(&self.storage[offset as usize..offset as usize + size as usize]);
    }

    fn write(&mut self, src: &[u8], size: u32, offset: u64) {
        self.writes.push((offset, size));
        self.storage[offset as usize..offset as usize + size as usize].copy_from_slice(src);
    }
}
