//! MMIO size and alignment adaptation.
//!
//! Widens accesses below a device's `min_op_size` (or merely misaligned to
//! it) into an aligned read-modify-write, and splits accesses above its
//! `max_op_size` into two halves, recursing. Implemented with an explicit
//! work stack rather than function recursion — the recursive formulation
//! in the crate's design notes is only stylistic, and a loop avoids
//! unbounded stack depth for a hot-path operation.

use crate::pam::MmioDevice;

/// Largest access window this adapter ever presents to a device.
const MAX_WINDOW: u32 = 16;

/// Reads `size` bytes at device-relative `offset` into `dst`, adapting to
/// `device`'s supported access-size window.
///
/// `size` must equal `dst.len()`.
pub fn mmio_read(device: &mut dyn MmioDevice, dst: &mut [u8], size: u32, offset: u64) {
    debug_assert_eq!(dst.len(), size as usize);

    let max = device.max_op_size();
    let mut done = 0u32;
    while done < size {
        let remaining = size - done;
        let piece_size = split_size(remaining, max);
        let piece = &mut dst[done as usize..(done + piece_size) as usize];
        read_within_window(device, piece, piece_size, offset + u64::from(done));
        done += piece_size;
    }
}

/// Writes `size` bytes from `src` at device-relative `offset`, adapting to
/// `device`'s supported access-size window. Symmetric to [`mmio_read`]: a
/// sub-`min_op_size` write is a read-modify-write at `min_op_size`.
pub fn mmio_write(device: &mut dyn MmioDevice, src: &[u8], size: u32, offset: u64) {
    debug_assert_eq!(src.len(), size as usize);

    let max = device.max_op_size();
    let mut done = 0u32;
    while done < size {
        let remaining = size - done;
        let piece_size = split_size(remaining, max);
        let piece = &src[done as usize..(done + piece_size) as usize];
        write_within_window(device, piece, piece_size, offset + u64::from(done));
        done += piece_size;
    }
}

/// Size of the next piece to carve off `remaining`, never exceeding `max`.
/// Splitting in halves (rather than flat `max`-sized chunks) keeps this
/// correct even when `remaining` is not itself a multiple of `max`, which
/// can happen when a page-crossing split hands the adapter an odd-sized
/// sub-access.
fn split_size(remaining: u32, max: u32) -> u32 {
    if remaining <= max {
        remaining
    } else {
        remaining / 2
    }
}

/// Computes the smallest power-of-two-aligned window starting at or below
/// `offset`, at least `min` bytes wide, that fully covers `[offset, offset +
/// size)`. Doubles from `min` rather than assuming `min` alone suffices —
/// a `size == min` access at a `min`-misaligned offset still needs a wider
/// window to cover the whole range.
fn widen_window(offset: u64, size: u32, min: u32) -> (u64, u32) {
    let mut window = min;
    loop {
        let aligned_off = offset & !u64::from(window - 1);
        if aligned_off + u64::from(window) >= offset + u64::from(size) {
            return (aligned_off, window);
        }
        window *= 2;
    }
}

/// Reads one piece already sized `<= max_op_size`, widening below (or
/// around the misalignment of) `min_op_size` with an aligned
/// read-modify-keep.
fn read_within_window(device: &mut dyn MmioDevice, dst: &mut [u8], size: u32, offset: u64) {
    let min = device.min_op_size();
    let aligned_off = offset & !u64::from(min - 1);
    if size >= min && offset == aligned_off {
        device.read(dst, size, offset);
        return;
    }

    let (aligned_off, window) = widen_window(offset, size, min);
    debug_assert!(window <= MAX_WINDOW);
    let diff = (offset - aligned_off) as usize;
    let mut scratch = [0u8; MAX_WINDOW as usize];
    device.read(&mut scratch[..window as usize], window, aligned_off);
    dst.copy_from_slice(&scratch[diff..diff + size as usize]);
}

/// Writes one piece already sized `<= max_op_size`, widening below (or
/// around the misalignment of) `min_op_size` with an aligned
/// read-modify-write.
fn write_within_window(device: &mut dyn MmioDevice, src: &[u8], size: u32, offset: u64) {
    let min = device.min_op_size();
    let aligned_off = offset & !u64::from(min - 1);
    if size >= min && offset == aligned_off {
        device.write(src, size, offset);
        return;
    }

    let (aligned_off, window) = widen_window(offset, size, min);
    debug_assert!(window <= MAX_WINDOW);
    let diff = (offset - aligned_off) as usize;
    let mut scratch = [0u8; MAX_WINDOW as usize];
    device.read(&mut scratch[..window as usize], window, aligned_off);
    scratch[diff..diff + size as usize].copy_from_slice(src);
    device.write(&scratch[..window as usize], window, aligned_off);
}
