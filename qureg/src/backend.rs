//! Optional accelerator delegation
//!
//! A register may be handed an [`Accelerator`] at construction. The handle
//! is explicit per-register state; there is no process-wide device
//! context. When no handle is present, or the device declines a call, the
//! CPU kernels run.

use num_complex::Complex64;

/// Contract for an external compute device servicing amplitude kernels.
///
/// An implementation receives the amplitude buffer, the 2×2 matrix and the
/// bitmask parameters of the kernel, and must produce exactly the result
/// the CPU kernel would: for every base index with zeros at the positions
/// in `powers_sorted`, the amplitude pair at `base | offset1` /
/// `base | offset2` is replaced by the matrix product.
///
/// Returning `false` declines the call and the CPU kernel runs instead, so
/// a device may service only the shapes it supports.
pub trait Accelerator: Send + Sync {
    /// Apply a 2×2 matrix over the offset pattern, in place.
    fn apply_2x2(
        &self,
        amplitudes: &mut [Complex64],
        matrix: &[Complex64; 4],
        offset1: usize,
        offset2: usize,
        powers_sorted: &[usize],
    ) -> bool;
}
