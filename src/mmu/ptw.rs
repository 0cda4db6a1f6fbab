//! Page-table walker.
//!
//! Generalized over [`PagingLayout`] instead of one hard-coded mode, so the
//! same algorithm drives Sv32, Sv39, Sv48, and Sv57. `Bare` never reaches
//! this module — the dispatcher takes the identity shortcut before the
//! walker is invoked.

use crate::arch::{HartContext, PagingLayout, PrivilegeMode};
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr};
use crate::hooks::{cas32_le, cas64_le, load32_le, load64_le};
use crate::pam::PhysAddrMap;

const PTE_VALID_BIT: u64 = 1;
const PTE_READ_BIT: u64 = 1 << 1;
const PTE_WRITE_BIT: u64 = 1 << 2;
const PTE_EXEC_BIT: u64 = 1 << 3;
const PTE_USER_BIT: u64 = 1 << 4;
const PTE_ACCESSED_BIT: u64 = 1 << 6;
const PTE_DIRTY_BIT: u64 = 1 << 7;
const PTE_PPN_SHIFT: u64 = 10;

/// A page-table entry, normalized to a 64-bit value regardless of the
/// on-disk PTE width (4 bytes in Sv32, 8 bytes elsewhere).
#[derive(Clone, Copy, Debug)]
struct Pte(u64);

impl Pte {
    const fn is_valid(self) -> bool {
        self.0 & PTE_VALID_BIT != 0
    }

    const fn can_read(self) -> bool {
        self.0 & PTE_READ_BIT != 0
    }

    const fn can_write(self) -> bool {
        self.0 & PTE_WRITE_BIT != 0
    }

    const fn is_user(self) -> bool {
        self.0 & PTE_USER_BIT != 0
    }

    /// A valid, non-pointer PTE: any of R/W/X set.
    const fn is_leaf(self) -> bool {
        self.0 & (PTE_READ_BIT | PTE_WRITE_BIT | PTE_EXEC_BIT) != 0
    }

    /// The reserved pointer encoding `R=0, W=1` is never valid.
    const fn is_reserved(self) -> bool {
        !self.can_read() && self.can_write()
    }

    const fn ppn(self) -> u64 {
        self.0 >> PTE_PPN_SHIFT
    }

    const fn is_accessed(self) -> bool {
        self.0 & PTE_ACCESSED_BIT != 0
    }

    const fn is_dirty(self) -> bool {
        self.0 & PTE_DIRTY_BIT != 0
    }

    const fn with_accessed(self) -> Self {
        Self(self.0 | PTE_ACCESSED_BIT)
    }

    const fn with_dirty(self) -> Self {
        Self(self.0 | PTE_DIRTY_BIT)
    }
}

/// Walks the page table rooted at `ctx.root_page_table` to translate
/// `vaddr` for `access`.
///
/// `perm_bit` is the access kind to check against the leaf PTE's
/// permission bits — normally equal to `access`, except that the
/// dispatcher substitutes `Fetch` for `Read` under `status.MXR`, letting an
/// execute-only page satisfy a read without the walker needing to know
/// about MXR itself.
///
/// # Errors
///
/// Returns the appropriate page fault [`Trap`] on any failure: no valid
/// translation, reserved PTE encoding, permission denied, a misaligned
/// superpage, or (for 64-bit modes) a non-canonical virtual address.
pub fn walk(
    pam: &mut PhysAddrMap,
    vaddr: VirtAddr,
    access: AccessType,
    perm_bit: AccessType,
    ctx: &HartContext,
    layout: PagingLayout,
    is_64bit_mode: bool,
) -> Result<PhysAddr, Trap> {
    if is_64bit_mode && !is_canonical(vaddr.val(), layout) {
        return Err(page_fault(vaddr.val(), access));
    }

    let mut table = ctx.root_page_table.val() & phys_mask(layout.phys_bits);
    let mut bit_off = layout.root_bit_off();

    for level in (0..layout.levels).rev() {
        let vpn_i = (vaddr.val() >> bit_off) & vpn_entry_mask(layout.vpn_bits);
        let pte_phys = PhysAddr::new(table + vpn_i * layout.pte_bytes);

        let Some(host) = pam.phys_to_host_mut(pte_phys) else {
            return Err(page_fault(vaddr.val(), access));
        };
        let raw = load_pte(host, layout.pte_bytes);
        let pte = Pte(raw);

        if !pte.is_valid() || pte.is_reserved() {
            return Err(page_fault(vaddr.val(), access));
        }

        if !pte.is_leaf() {
            if level == 0 {
                return Err(page_fault(vaddr.val(), access));
            }
            table = (pte.ppn() << 12) & phys_mask(layout.phys_bits);
            bit_off -= layout.vpn_bits;
            continue;
        }

        if pte.0 & perm_bit.pte_bit() == 0 {
            return Err(page_fault(vaddr.val(), access));
        }
        if ctx.priv_mode == PrivilegeMode::User && !pte.is_user() {
            return Err(page_fault(vaddr.val(), access));
        }
        if ctx.priv_mode == PrivilegeMode::Supervisor && pte.is_user() {
            if !ctx.sum || access == AccessType::Fetch {
                return Err(page_fault(vaddr.val(), access));
            }
        }

        // Any PPN bit below this level's page offset means a lower-level
        // index was encoded into a superpage leaf — reject it.
        let below_level_bits = bit_off - 12;
        let ppn_low_mask = phys_mask(below_level_bits);
        if pte.ppn() & ppn_low_mask != 0 {
            return Err(page_fault(vaddr.val(), access));
        }

        let mut new_pte = pte;
        if !pte.is_accessed() {
            new_pte = new_pte.with_accessed();
        }
        if access == AccessType::Write && !pte.is_dirty() {
            new_pte = new_pte.with_dirty();
        }
        if new_pte.0 != pte.0 {
            // SAFETY: `host` points at an 8- or 4-byte PTE inside RAM,
            // naturally aligned since `pte_phys` is a multiple of
            // `pte_bytes`.
            unsafe { cas_pte(host, pte.0, new_pte.0, layout.pte_bytes) };
        }

        let vmask = (1u64 << bit_off) - 1;
        let ppn = new_pte.ppn() & phys_mask(layout.phys_bits - 12);
        let paddr = (ppn << 12) | (vaddr.val() & vmask);
        return Ok(PhysAddr::new(paddr));
    }

    Err(page_fault(vaddr.val(), access))
}

/// Rejects any `vaddr` whose bits above the highest implemented VPN bit are
/// not a sign extension of that bit (the canonical-address check required
/// for Sv39/48/57; Sv32 addresses are exactly 32 bits wide and need none).
fn is_canonical(vaddr: u64, layout: PagingLayout) -> bool {
    let top_bit = layout.root_bit_off() as u64 + layout.vpn_bits as u64 - 1;
    let sign = (vaddr >> top_bit) & 1;
    let expected = if sign == 1 { u64::MAX } else { 0 };
    (vaddr >> (top_bit + 1)) == (expected >> (top_bit + 1))
}

const fn vpn_entry_mask(vpn_bits: u32) -> u64 {
    (1u64 << vpn_bits) - 1
}

const fn phys_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn load_pte(host: *mut u8, pte_bytes: u64) -> u64 {
    if pte_bytes == 4 {
        // SAFETY: caller guarantees `host` is valid for a 4-byte read.
        u64::from(unsafe { load32_le(host.cast_const()) })
    } else {
        // SAFETY: caller guarantees `host` is valid for an 8-byte read.
        unsafe { load64_le(host.cast_const()) }
    }
}

/// # Safety
///
/// `host` must be valid for atomic reads/writes of `pte_bytes` bytes at its
/// natural alignment.
unsafe fn cas_pte(host: *mut u8, expected: u64, desired: u64, pte_bytes: u64) {
    if pte_bytes == 4 {
        unsafe {
            let _ = cas32_le(host, expected as u32, desired as u32);
        }
    } else {
        unsafe {
            let _ = cas64_le(host, expected, desired);
        }
    }
}

fn page_fault(addr: u64, access: AccessType) -> Trap {
    let trap = match access {
        AccessType::Fetch => Trap::InstructionPageFault(addr),
        AccessType::Read => Trap::LoadPageFault(addr),
        AccessType::Write => Trap::StorePageFault(addr),
    };
    tracing::trace!(vaddr = addr, ?access, "page table walk faulted");
    trap
}
