//! Software translation lookaside buffer.
//!
//! Direct-mapped, indexed by the low bits of the virtual page number. Each
//! slot holds three independent tags — one per access kind — so a
//! write-capable mapping also satisfies a subsequent read without a second
//! walk, while a later write to a read-only mapping still re-walks (so the
//! D bit gets set). This is a genuine generalization of a single
//! permission-tagged entry per slot, not just a rename: one tag with a
//! permission mask would force a re-walk on every permission upgrade within
//! a slot, which a write-then-read sequence must not pay for.
//!
//! Validity uses an explicit sentinel (`u64::MAX`, never a valid VPN) rather
//! than the "tag = VPN - 1" trick, which needs slot 0 specially initialized
//! after a full flush and is easy to get wrong.

use crate::common::AccessType;

/// Sentinel tag meaning "no mapping installed here".
const INVALID_TAG: u64 = u64::MAX;

/// One direct-mapped TLB slot: three access-kind tags sharing one
/// `host_bias`.
///
/// `host_bias` already encodes "host pointer for this page minus the
/// page's virtual base", so a hit resolves to a host address with a single
/// add: `host_bias + vaddr`.
#[derive(Clone, Copy)]
struct Slot {
    tag_r: u64,
    tag_w: u64,
    tag_x: u64,
    host_bias: u64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            tag_r: INVALID_TAG,
            tag_w: INVALID_TAG,
            tag_x: INVALID_TAG,
            host_bias: 0,
        }
    }
}

/// A direct-mapped, per-hart software TLB.
pub struct Tlb {
    slots: Vec<Slot>,
    mask: u64,
}

impl Tlb {
    /// Creates a TLB with `entries` slots, rounded up to the next power of
    /// two if necessary.
    #[must_use]
    pub fn new(entries: usize) -> Self {
        let entries = entries.max(1).next_power_of_two();
        Self {
            slots: vec![Slot::default(); entries],
            mask: (entries - 1) as u64,
        }
    }

    #[inline(always)]
    const fn index(&self, vpn: u64) -> usize {
        (vpn & self.mask) as usize
    }

    /// Looks up `vpn` for access kind `op`. On a hit, returns the host
    /// address for `vaddr`.
    #[inline(always)]
    #[must_use]
    pub fn lookup(&self, vpn: u64, op: AccessType, vaddr: u64) -> Option<u64> {
        // SAFETY: `index` masks to `< self.slots.len()` since `mask =
        // slots.len() - 1` and `slots.len()` is a power of two.
        let slot = unsafe { self.slots.get_unchecked(self.index(vpn)) };
        let tag = match op {
            AccessType::Read => slot.tag_r,
            AccessType::Write => slot.tag_w,
            AccessType::Fetch => slot.tag_x,
        };
        (tag == vpn).then(|| slot.host_bias.wrapping_add(vaddr))
    }

    /// Installs a mapping for `vpn` -> `host_bias` after a successful walk
    /// for access kind `op`, per the fill rules in the crate's TLB design:
    /// a READ fill also satisfies future reads through the same tag, a
    /// WRITE fill additionally satisfies reads (a write-capable page always
    /// readable), and an EXEC fill only satisfies fetches. Any other kind's
    /// tag is left alone if it already matches `vpn` (so an upgrade doesn't
    /// needlessly force a re-walk for the unrelated kind), and invalidated
    /// otherwise.
    pub fn fill(&mut self, vpn: u64, host_bias: u64, op: AccessType) {
        let idx = self.index(vpn);
        let slot = &mut self.slots[idx];
        slot.host_bias = host_bias;

        match op {
            AccessType::Read => {
                slot.tag_r = vpn;
                if slot.tag_w != vpn {
                    slot.tag_w = INVALID_TAG;
                }
                if slot.tag_x != vpn {
                    slot.tag_x = INVALID_TAG;
                }
            }
            AccessType::Write => {
                slot.tag_r = vpn;
                slot.tag_w = vpn;
                if slot.tag_x != vpn {
                    slot.tag_x = INVALID_TAG;
                }
            }
            AccessType::Fetch => {
                slot.tag_x = vpn;
                if slot.tag_r != vpn {
                    slot.tag_r = INVALID_TAG;
                }
                if slot.tag_w != vpn {
                    slot.tag_w = INVALID_TAG;
                }
            }
        }
    }

    /// Invalidates every slot. Called on `SFENCE.VMA` with no operand, a
    /// `satp` write, or a privilege-affecting CSR change.
    pub fn flush(&mut self) {
        tracing::debug!(entries = self.slots.len(), "tlb full flush");
        for slot in &mut self.slots {
            *slot = Slot::default();
        }
    }

    /// Invalidates only the slot that would hold `vpn`, on all three tags.
    /// Called on `SFENCE.VMA vaddr`.
    pub fn flush_page(&mut self, vpn: u64) {
        tracing::trace!(vpn, "tlb page flush");
        let idx = self.index(vpn);
        self.slots[idx] = Slot::default();
    }
}
