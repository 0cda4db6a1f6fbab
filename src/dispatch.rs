//! The MMU dispatcher: the top-level entry point the rest of the emulator
//! calls for every load, store, and instruction fetch.
//!
//! Handles, in order: page-crossing splits, MPRV/MXR privilege blending,
//! the Bare/Machine identity shortcut, the TLB fast path, and the slow path
//! (walker, then RAM copy or MMIO dispatch), raising a trap through
//! `sink` on any failure.

use crate::arch::{HartContext, PagingMode, PrivilegeMode};
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr, PAGE_MASK, PAGE_SIZE};
use crate::hooks::{JitInvalidate, TrapSink};
use crate::mmio;
use crate::mmu::{Mmu, Resolved};
use crate::pam::PhysAddrMap;

/// Translates `vaddr` for `op` and performs the access, copying between
/// guest memory and `buf`.
///
/// For `Write`, bytes flow from `buf` into guest memory; for `Read` and
/// `Fetch`, bytes flow from guest memory into `buf`. Returns `false` if a
/// trap was raised through `sink`, in which case the caller must discard
/// the current instruction's effects and not retry the access.
pub fn mmu_access(
    mmu: &mut Mmu,
    pam: &mut PhysAddrMap,
    ctx: &HartContext,
    vaddr: VirtAddr,
    buf: &mut [u8],
    op: AccessType,
    sink: &mut impl TrapSink,
    jit: &mut impl JitInvalidate,
) -> bool {
    let size = buf.len() as u64;
    let page_off = vaddr.page_offset();

    if page_off + size > PAGE_SIZE {
        let first_len = (PAGE_SIZE - page_off) as usize;
        let (first, second) = buf.split_at_mut(first_len);
        // Each half must succeed independently. A fault partway through
        // has already committed the first half's side effects in RAM;
        // this matches the source's behavior (see the crate's notes on
        // page-crossing atomicity) rather than rolling both halves back.
        if !mmu_access(mmu, pam, ctx, vaddr, first, op, sink, jit) {
            return false;
        }
        let next = VirtAddr::new(vaddr.val() + first_len as u64);
        return mmu_access(mmu, pam, ctx, next, second, op, sink, jit);
    }

    let is_fetch = op == AccessType::Fetch;
    let eff_priv = ctx.effective_privilege(is_fetch);
    // MXR lets execute-only pages satisfy reads; model that as checking
    // the X permission bit instead of R, without the walker needing to
    // know about MXR at all.
    let perm_bit = if ctx.mxr && op == AccessType::Read {
        AccessType::Fetch
    } else {
        op
    };

    if eff_priv == PrivilegeMode::Machine || ctx.mmu_mode == PagingMode::Bare {
        let paddr = PhysAddr::new(vaddr.val());
        return complete(mmu, pam, vaddr, paddr, buf, op, sink, jit, false);
    }

    let walk_ctx = HartContext {
        priv_mode: eff_priv,
        ..*ctx
    };

    match mmu.translate(pam, vaddr, op, perm_bit, &walk_ctx) {
        Err(trap) => {
            sink.raise_trap(trap);
            false
        }
        Ok(Resolved::Host(host)) => {
            // SAFETY: `host` is a TLB hit's biased host address, only ever
            // filled from a RAM hit through `PhysAddrMap::phys_to_host_mut`
            // for the page containing `vaddr`, so it is valid for
            // `buf.len()` bytes (the page-crossing split above guarantees
            // `buf` never spans past the page boundary).
            unsafe { copy(host as *mut u8, buf, op) };
            true
        }
        Ok(Resolved::Phys(paddr)) => complete(mmu, pam, vaddr, paddr, buf, op, sink, jit, true),
    }
}

/// Resolves `paddr` through the PAM and performs the access.
///
/// `allow_fill` installs a TLB entry on a RAM hit; it is `false` for the
/// Bare/Machine shortcut, where no walk happened and there is nothing
/// meaningful to cache.
#[allow(clippy::too_many_arguments)]
fn complete(
    mmu: &mut Mmu,
    pam: &mut PhysAddrMap,
    vaddr: VirtAddr,
    paddr: PhysAddr,
    buf: &mut [u8],
    op: AccessType,
    sink: &mut impl TrapSink,
    jit: &mut impl JitInvalidate,
    allow_fill: bool,
) -> bool {
    if let Some(host) = pam.phys_to_host_mut(paddr) {
        if allow_fill {
            let page_vaddr = vaddr.val() & !PAGE_MASK;
            let page_paddr = PhysAddr::new(paddr.val() & !PAGE_MASK);
            if let Some(page_host) = pam.phys_to_host_mut(page_paddr) {
                let host_bias = (page_host as u64).wrapping_sub(page_vaddr);
                mmu.fill(vaddr, host_bias, op);
            }
        }
        // SAFETY: `host` comes from `PhysAddrMap::phys_to_host_mut(paddr)`
        // just above, which guarantees `buf.len()` bytes of valid RAM
        // starting at `host` (the page-crossing split above guarantees
        // `buf` never spans past the page boundary `paddr` lies in).
        unsafe { copy(host, buf, op) };
        if op == AccessType::Write {
            jit.jit_invalidate(vaddr.val(), paddr.val(), buf.len() as u64);
        }
        return true;
    }

    if let Some(device) = pam.find_mmio(paddr) {
        let (begin, _) = device.range();
        let offset = paddr.val() - begin;
        let size = buf.len() as u32;
        match op {
            AccessType::Write => mmio::mmio_write(device, buf, size, offset),
            AccessType::Read | AccessType::Fetch => mmio::mmio_read(device, buf, size, offset),
        }
        return true;
    }

    sink.raise_trap(access_fault(vaddr.val(), op));
    false
}

/// Copies between `buf` and the host address `ptr`, in the direction
/// implied by `op`.
///
/// # Safety
///
/// `ptr` must be valid for `buf.len()` bytes in the direction `op` implies.
unsafe fn copy(ptr: *mut u8, buf: &mut [u8], op: AccessType) {
    unsafe {
        if op == AccessType::Write {
            std::ptr::copy_nonoverlapping(buf.as_ptr(), ptr, buf.len());
        } else {
            std::ptr::copy_nonoverlapping(ptr.cast_const(), buf.as_mut_ptr(), buf.len());
        }
    }
}

fn access_fault(addr: u64, op: AccessType) -> Trap {
    match op {
        AccessType::Fetch => Trap::InstructionAccessFault(addr),
        AccessType::Read => Trap::LoadAccessFault(addr),
        AccessType::Write => Trap::StoreAccessFault(addr),
    }
}
