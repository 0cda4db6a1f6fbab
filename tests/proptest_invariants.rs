#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

//! Property-based tests for the spec's quantified invariants: P5 (A/D
//! monotonicity), P6 (misaligned superpage rejection), and P7 (the
//! canonical-address check).

mod common;

use common::{make_pte, Fixture, A, D, R, W, X};
use proptest::prelude::*;
use riscv_mmu_core::{AccessType, Mmu, Resolved, Trap, VirtAddr};

const ROOT: u64 = common::MEM_BASE;

proptest! {
    /// P6: any nonzero low PPN bit at a superpage leaf must fault. Covers
    /// misalignment patterns within the low 9 of the gigapage's required
    /// 18 zero low bits — a subset of the full misaligned space, but
    /// enough to catch an off-by-level-count error in the mask width.
    #[test]
    fn misaligned_gigapage_always_faults(low_bits in 1u64..0x200) {
        let mut fx = Fixture::new();
        let mut mmu = Mmu::new(4);
        fx.write_pte(ROOT, 0, 8, make_pte(low_bits, R | W | X));

        let res = mmu.translate(
            &mut fx.pam,
            VirtAddr::new(0x0),
            AccessType::Read,
            AccessType::Read,
            &fx.ctx,
        );
        prop_assert!(matches!(res, Err(Trap::LoadPageFault(0))));
    }

    /// Inverse of the above: an aligned gigapage (the low 18 PPN bits
    /// spanning the two levels below a Sv39 root all zero) never faults on
    /// the misalignment check.
    #[test]
    fn aligned_gigapage_never_faults_on_misalignment(high_ppn in 0u64..0x100) {
        let mut fx = Fixture::new();
        let mut mmu = Mmu::new(4);
        // Shift into the high PPN bits only, leaving the low 18 bits (the
        // gigapage's required alignment) zero.
        fx.write_pte(ROOT, 0, 8, make_pte(high_ppn << 18, R | W | X));

        let res = mmu.translate(
            &mut fx.pam,
            VirtAddr::new(0x0),
            AccessType::Read,
            AccessType::Read,
            &fx.ctx,
        );
        prop_assert!(matches!(res, Ok(Resolved::Phys(_))));
    }

    /// P7: a random Sv39 virtual address whose bit 38 disagrees with any
    /// of bits 39..63 is rejected before any PTE is loaded — an empty
    /// (all-zero, hence all-invalid) root table is enough to prove the
    /// canonical check runs first, since a PTE load would also fault.
    #[test]
    fn non_canonical_sv39_address_always_faults(
        low in 0u64..(1u64 << 39),
        high in 1u64..0x1FF_FFFFu64,
    ) {
        let mut fx = Fixture::new();
        let mut mmu = Mmu::new(4);

        // Bit 38 forced to 0, but some high bit forced to 1: never a
        // valid sign extension.
        let vaddr = (low & ((1u64 << 38) - 1)) | (high << 39);
        let res = mmu.translate(
            &mut fx.pam,
            VirtAddr::new(vaddr),
            AccessType::Read,
            AccessType::Read,
            &fx.ctx,
        );
        prop_assert!(matches!(res, Err(Trap::LoadPageFault(v)) if v == vaddr));
    }

    /// P5: translating for WRITE never clears a bit that was already set
    /// in the PTE, and always leaves A and D set afterward.
    #[test]
    fn ad_update_is_monotonic(seed_flags in 0u64..0x100) {
        let mut fx = Fixture::new();
        let mut mmu = Mmu::new(4);
        let initial = make_pte(0x1000, R | W | (seed_flags & (A | D)));
        fx.write_pte(ROOT, 0, 8, initial);

        let res = mmu.translate(
            &mut fx.pam,
            VirtAddr::new(0x0),
            AccessType::Write,
            AccessType::Write,
            &fx.ctx,
        );
        prop_assert!(matches!(res, Ok(Resolved::Phys(_))));

        let after = fx.read_pte(ROOT, 0, 8);
        prop_assert_eq!(after & initial, initial, "no bit present before may be cleared");
        prop_assert_eq!(after & (A | D), A | D, "A and D must both be set after a WRITE");
    }
}
