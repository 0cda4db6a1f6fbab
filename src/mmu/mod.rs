//! The memory management unit: software TLB plus page-table walker.
//!
//! `Mmu` is the per-hart translation state — one direct-mapped TLB and a
//! handle onto the generic walker in [`ptw`]. It does not know about RAM or
//! MMIO devices; [`crate::dispatch`] resolves the [`Resolved::Phys`] it
//! produces through the physical address map and decides whether the
//! result is cacheable.

/// The direct-mapped software TLB.
pub mod tlb;

/// The page-table walker.
pub mod ptw;

use crate::arch::HartContext;
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr};
use crate::pam::PhysAddrMap;

pub use tlb::Tlb;

/// The result of resolving a virtual address, before the dispatcher decides
/// what to do with it.
#[derive(Clone, Copy, Debug)]
pub enum Resolved {
    /// A TLB hit: already biased to a host address, ready to use directly.
    Host(u64),
    /// A TLB miss resolved by the walker (or the Bare/Machine shortcut):
    /// a physical address still needing resolution through the PAM.
    Phys(PhysAddr),
}

/// Per-hart MMU state: one direct-mapped TLB.
///
/// A single TLB with three parallel tags (§[`tlb`]) replaces what the
/// teacher crate modeled as two TLBs, one per access kind — the tags
/// already separate read/write/execute, so a second array would be
/// redundant.
pub struct Mmu {
    tlb: Tlb,
}

impl Mmu {
    /// Creates an MMU with a `tlb_entries`-entry TLB (rounded up to a power
    /// of two).
    #[must_use]
    pub fn new(tlb_entries: usize) -> Self {
        Self {
            tlb: Tlb::new(tlb_entries),
        }
    }

    /// Resolves `vaddr` for `access`, consulting the TLB first and falling
    /// back to a page-table walk on a miss.
    ///
    /// `perm_bit` is the permission bit to check against the leaf PTE —
    /// ordinarily equal to `access`, except that the caller substitutes
    /// `Fetch` for `Read` under `status.MXR`. Callers must not invoke this
    /// for `Bare` mode; the dispatcher's identity shortcut bypasses the MMU
    /// entirely in that case.
    ///
    /// # Errors
    ///
    /// Returns the walker's page fault [`Trap`] on any translation failure.
    ///
    /// # Panics
    ///
    /// Panics if `ctx.mmu_mode` is `Bare`.
    #[allow(clippy::expect_used)]
    pub fn translate(
        &mut self,
        pam: &mut PhysAddrMap,
        vaddr: VirtAddr,
        access: AccessType,
        perm_bit: AccessType,
        ctx: &HartContext,
    ) -> Result<Resolved, Trap> {
        if let Some(host) = self.tlb.lookup(vaddr.vpn(), access, vaddr.val()) {
            return Ok(Resolved::Host(host));
        }

        let layout = ctx
            .mmu_mode
            .layout()
            .expect("translate() must not be called for Bare mode");
        let paddr = ptw::walk(
            pam,
            vaddr,
            access,
            perm_bit,
            ctx,
            layout,
            ctx.mmu_mode.is_64bit(),
        )?;
        Ok(Resolved::Phys(paddr))
    }

    /// Installs a TLB mapping for the page containing `vaddr`, biased so
    /// that `host_bias + any_vaddr_in_page` is the matching host address.
    pub fn fill(&mut self, vaddr: VirtAddr, host_bias: u64, op: AccessType) {
        self.tlb.fill(vaddr.vpn(), host_bias, op);
    }

    /// Invalidates the entire TLB. Called on `SFENCE.VMA` with no operand,
    /// a `satp` write, or a privilege-affecting CSR change.
    pub fn flush(&mut self) {
        self.tlb.flush();
    }

    /// Invalidates only the slot for `vaddr`'s page. Called on
    /// `SFENCE.VMA vaddr`.
    pub fn flush_page(&mut self, vaddr: VirtAddr) {
        self.tlb.flush_page(vaddr.vpn());
    }
}
