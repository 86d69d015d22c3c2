//! Parallel iteration over the permutation basis
//!
//! All register kernels iterate a half-open range of permutation indices.
//! The skip variants iterate only the indices where chosen bits are held
//! fixed at zero: a logical counter runs over the remaining bit positions
//! and zero bits are inserted at the fixed positions, so the kernel body
//! never needs to branch on control or carry bits.
//!
//! Work distribution is dynamic: `num_cores` worker threads pull raw
//! counter values from a shared atomic until the range is exhausted. There
//! is no ordering between body invocations; the call returns only after
//! every worker has joined. Bodies must write disjoint outputs.

use crate::error::{Result, StateError};
use num_complex::Complex64;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Ranges smaller than this run inline on the calling thread.
const SERIAL_CUTOFF: usize = 128;

/// Data-parallel iteration over permutation indices.
#[derive(Debug, Clone)]
pub struct ParallelFor {
    num_cores: usize,
}

impl ParallelFor {
    /// Scheduler with one worker per available hardware thread.
    pub fn new() -> Self {
        let num_cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self { num_cores }
    }

    /// Scheduler with an explicit worker count (minimum 1).
    pub fn with_cores(num_cores: usize) -> Self {
        Self {
            num_cores: num_cores.max(1),
        }
    }

    /// Worker count hint
    #[inline]
    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    fn dispatch<I, F>(&self, begin: usize, end: usize, inc: I, body: F)
    where
        I: Fn(usize) -> usize + Sync,
        F: Fn(usize) + Sync,
    {
        if self.num_cores <= 1 || end.saturating_sub(begin) <= SERIAL_CUTOFF {
            for raw in begin..end {
                let i = inc(raw);
                if i >= end {
                    break;
                }
                body(i);
            }
            return;
        }

        let counter = AtomicUsize::new(begin);
        thread::scope(|scope| {
            for _ in 0..self.num_cores {
                scope.spawn(|| loop {
                    let raw = counter.fetch_add(1, Ordering::Relaxed);
                    if raw >= end {
                        break;
                    }
                    // The mapped index is monotonic in the raw counter, so
                    // clamping on `end` terminates every worker.
                    let i = inc(raw);
                    if i >= end {
                        break;
                    }
                    body(i);
                });
            }
        });
    }

    /// Invoke `body(i)` for every `i` in `[begin, end)`.
    pub fn par_for<F>(&self, begin: usize, end: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        self.dispatch(begin, end, |i| i, body);
    }

    /// Iterate the indices of `[begin, end)` where `mask_width` bits,
    /// starting at the bit position of the single-bit `skip_mask`, are
    /// held fixed at zero.
    pub fn par_for_skip<F>(
        &self,
        begin: usize,
        end: usize,
        skip_mask: usize,
        mask_width: usize,
        body: F,
    ) where
        F: Fn(usize) + Sync,
    {
        debug_assert!(skip_mask.is_power_of_two());
        let low_mask = skip_mask - 1;
        self.dispatch(
            begin,
            end,
            move |i| ((i & !low_mask) << mask_width) | (i & low_mask),
            body,
        );
    }

    /// Iterate the indices of `[begin, end)` with a zero bit held at each
    /// position in `masks`. The masks must be single-bit values in
    /// strictly increasing order.
    pub fn par_for_mask<F>(&self, begin: usize, end: usize, masks: &[usize], body: F) -> Result<()>
    where
        F: Fn(usize) + Sync,
    {
        for pair in masks.windows(2) {
            if pair[1] <= pair[0] {
                return Err(StateError::UnorderedMasks);
            }
        }

        // Pre-split each mask into the bits below and above its position.
        let steps: Vec<(usize, usize)> = masks.iter().map(|&m| (m - 1, !((m - 1) | m))).collect();

        self.dispatch(
            begin,
            end,
            move |mut i| {
                for &(low, high) in &steps {
                    i = ((i << 1) & high) | (i & low);
                }
                i
            },
            body,
        );
        Ok(())
    }

    /// Parallel reduction of the L2 norm: sqrt of the summed squared
    /// magnitudes, accumulated in per-worker partial sums.
    pub fn par_norm(&self, amplitudes: &[Complex64]) -> f64 {
        amplitudes
            .par_iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }
}

impl Default for ParallelFor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn collect_indices<F>(run: F) -> Vec<usize>
    where
        F: FnOnce(&(dyn Fn(usize) + Sync)),
    {
        let seen = Mutex::new(Vec::new());
        run(&|i| seen.lock().unwrap().push(i));
        let mut indices = seen.into_inner().unwrap();
        indices.sort_unstable();
        indices
    }

    #[test]
    fn par_for_visits_each_index_once() {
        let par = ParallelFor::with_cores(4);
        let indices = collect_indices(|body| par.par_for(0, 1 << 10, body));
        assert_eq!(indices, (0..1 << 10).collect::<Vec<_>>());
    }

    #[test]
    fn par_for_skip_holds_bit_clear() {
        let par = ParallelFor::with_cores(4);
        let indices = collect_indices(|body| par.par_for_skip(0, 1 << 10, 1 << 3, 1, body));
        assert_eq!(indices.len(), 1 << 9);
        for i in &indices {
            assert_eq!(i & (1 << 3), 0);
        }
        // Every carry-clear index appears exactly once.
        let expected: Vec<usize> = (0..1 << 10).filter(|i| i & (1 << 3) == 0).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn par_for_skip_wide_window() {
        let par = ParallelFor::with_cores(2);
        let indices = collect_indices(|body| par.par_for_skip(0, 1 << 12, 1 << 2, 4, body));
        let window: usize = 0b1111 << 2;
        assert_eq!(indices.len(), 1 << 8);
        for i in &indices {
            assert_eq!(i & window, 0);
        }
    }

    #[test]
    fn par_for_mask_inserts_zeros() {
        let par = ParallelFor::with_cores(4);
        let masks = [1 << 1, 1 << 4];
        let indices = collect_indices(|body| {
            par.par_for_mask(0, 1 << 8, &masks, body).unwrap();
        });
        assert_eq!(indices.len(), 1 << 6);
        for i in &indices {
            assert_eq!(i & (1 << 1), 0);
            assert_eq!(i & (1 << 4), 0);
        }
    }

    #[test]
    fn par_for_mask_rejects_unordered() {
        let par = ParallelFor::with_cores(2);
        let masks = [1 << 4, 1 << 1];
        let err = par.par_for_mask(0, 1 << 8, &masks, |_| {}).unwrap_err();
        assert_eq!(err, StateError::UnorderedMasks);
    }

    #[test]
    fn par_norm_matches_serial() {
        let par = ParallelFor::new();
        let amps: Vec<Complex64> = (0..256)
            .map(|i| Complex64::new(i as f64 * 0.01, -(i as f64) * 0.005))
            .collect();
        let serial = amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        assert_relative_eq!(par.par_norm(&amps), serial, epsilon = 1e-12);
    }
}
