//! The coherent register
//!
//! A [`CoherentUnit`] owns a dense state vector of 2^n amplitudes and is
//! mutated exclusively through its own operations. Every gate ultimately
//! funnels into [`CoherentUnit::apply_2x2`]: a 2×2 matrix applied over an
//! offset pattern that selects a two-dimensional subspace for each
//! combination of the remaining bits. Register-level operations
//! (arithmetic, shifts, indexed loads) instead permute amplitudes into a
//! fresh buffer under bitmask index arithmetic and swap it into place.
//!
//! Normalization is deferred: kernels that can drift amplitude magnitudes
//! record the new norm in `running_norm`, and the state is renormalized
//! lazily before any operation whose result depends on absolute
//! probability.

use crate::backend::Accelerator;
use crate::error::{RegisterError, Result};
use crate::random::RandomSource;
use num_complex::Complex64;
use qureg_state::{ParallelFor, StateVector};
use std::f64::consts::PI;
use std::sync::Arc;

/// Shared amplitude pointer handed to kernel bodies.
///
/// Kernel bodies run on the worker pool and write scattered indices; the
/// iterator contract guarantees every body observes a unique index, so the
/// writes are disjoint.
#[derive(Clone, Copy)]
pub(crate) struct SharedAmps(*mut Complex64);

unsafe impl Send for SharedAmps {}
unsafe impl Sync for SharedAmps {}

impl SharedAmps {
    pub(crate) fn new(ptr: *mut Complex64) -> Self {
        Self(ptr)
    }

    /// # Safety
    /// `index` must be in bounds for the underlying buffer.
    #[inline]
    pub(crate) unsafe fn read(&self, index: usize) -> Complex64 {
        *self.0.add(index)
    }

    /// # Safety
    /// `index` must be in bounds and not written by any other body.
    #[inline]
    pub(crate) unsafe fn write(&self, index: usize, value: Complex64) {
        *self.0.add(index) = value;
    }
}

/// An n-qubit register holding the complex amplitudes of every
/// permutation basis state.
///
/// # Example
///
/// ```
/// use qureg::CoherentUnit;
///
/// let mut reg = CoherentUnit::new(2, 0).unwrap();
/// reg.h(0).unwrap();
/// reg.cnot(0, 1).unwrap();
/// // Bell state: only |00⟩ and |11⟩ carry probability.
/// assert!((reg.prob_all(0b00).unwrap() - 0.5).abs() < 1e-9);
/// assert!((reg.prob_all(0b11).unwrap() - 0.5).abs() < 1e-9);
/// ```
pub struct CoherentUnit {
    pub(crate) qubit_count: usize,
    pub(crate) max_q_power: usize,
    pub(crate) state: StateVector,
    pub(crate) running_norm: f64,
    pub(crate) rand: RandomSource,
    pub(crate) random_seed: u32,
    pub(crate) par: ParallelFor,
    pub(crate) backend: Option<Arc<dyn Accelerator>>,
}

impl CoherentUnit {
    /// Register of `qubit_count` qubits in the pure permutation state
    /// `init_perm`, carried on a random global phase.
    ///
    /// The random phase replicates the unknowable initial phase of a
    /// physical system; code that accidentally depends on global phase
    /// breaks loudly instead of silently.
    pub fn new(qubit_count: usize, init_perm: usize) -> Result<Self> {
        let seed: u32 = rand::random();
        let mut unit =
            Self::with_parts(qubit_count, init_perm, None, RandomSource::from_seed(seed), None)?;
        unit.random_seed = seed;
        Ok(unit)
    }

    /// Register with a caller-chosen global phase factor (expected to have
    /// unit modulus).
    pub fn with_phase(qubit_count: usize, init_perm: usize, phase: Complex64) -> Result<Self> {
        Self::with_parts(qubit_count, init_perm, Some(phase), RandomSource::new(), None)
    }

    /// Register drawing from a shared random source. Registers sharing a
    /// source consume one common sampling sequence.
    pub fn with_random_source(
        qubit_count: usize,
        init_perm: usize,
        rand: RandomSource,
    ) -> Result<Self> {
        Self::with_parts(qubit_count, init_perm, None, rand, None)
    }

    /// Fully-specified construction: optional pinned phase, random source,
    /// and optional accelerator handle for kernel delegation.
    pub fn with_parts(
        qubit_count: usize,
        init_perm: usize,
        phase: Option<Complex64>,
        rand: RandomSource,
        backend: Option<Arc<dyn Accelerator>>,
    ) -> Result<Self> {
        let mut state = StateVector::zeroed(qubit_count)?;
        let max_q_power = state.dimension();
        if init_perm >= max_q_power {
            return Err(RegisterError::PermutationOutOfRange {
                permutation: init_perm,
                dimension: max_q_power,
            });
        }

        let phase_fac = match phase {
            Some(p) => p,
            None => Complex64::from_polar(1.0, rand.next_double() * 2.0 * PI),
        };
        state.amplitudes_mut()[init_perm] = phase_fac;

        Ok(Self {
            qubit_count,
            max_q_power,
            state,
            running_norm: 1.0,
            rand,
            random_seed: 0,
            par: ParallelFor::new(),
            backend,
        })
    }

    /// Copy of this register: same amplitudes and running norm, sharing
    /// the random source and any accelerator handle.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            qubit_count: self.qubit_count,
            max_q_power: self.max_q_power,
            state: StateVector::from_amplitudes(self.qubit_count, self.state.amplitudes())?,
            running_norm: self.running_norm,
            rand: self.rand.clone(),
            random_seed: self.random_seed,
            par: self.par.clone(),
            backend: self.backend.clone(),
        })
    }

    /// Number of qubits
    #[inline]
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Dimension of the state space (2^qubit_count)
    #[inline]
    pub fn max_q_power(&self) -> usize {
        self.max_q_power
    }

    /// Raw amplitude view. Magnitudes are only meaningful relative to the
    /// current running norm; see [`CoherentUnit::normalized_state`].
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        self.state.amplitudes()
    }

    /// Cached L2 norm of the buffer
    #[inline]
    pub fn running_norm(&self) -> f64 {
        self.running_norm
    }

    /// Last seed applied through [`CoherentUnit::set_random_seed`]
    #[inline]
    pub fn random_seed(&self) -> u32 {
        self.random_seed
    }

    /// Reseed the (possibly shared) random source. Two runs with the same
    /// seed on a single-threaded build produce identical measurement
    /// sequences.
    pub fn set_random_seed(&mut self, seed: u32) {
        self.random_seed = seed;
        self.rand.reseed(seed);
    }

    /// Worker threads used by the parallel kernels
    #[inline]
    pub fn num_cores(&self) -> usize {
        self.par.num_cores()
    }

    /// Override the worker thread count.
    pub fn set_num_cores(&mut self, num_cores: usize) {
        self.par = ParallelFor::with_cores(num_cores);
    }

    /// Replace the amplitude buffer with caller-provided state. The norm
    /// is recomputed, so an unnormalized input is corrected on the next
    /// probability-sensitive operation.
    pub fn set_amplitudes(&mut self, amplitudes: &[Complex64]) -> Result<()> {
        if amplitudes.len() != self.max_q_power {
            return Err(RegisterError::State(qureg_state::StateError::DimensionMismatch {
                expected: self.max_q_power,
                actual: amplitudes.len(),
            }));
        }
        self.state.amplitudes_mut().copy_from_slice(amplitudes);
        self.update_running_norm();
        Ok(())
    }

    /// Normalize if needed and copy the exact quantum state out.
    pub fn normalized_state(&mut self) -> Vec<Complex64> {
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
        self.state.amplitudes().to_vec()
    }

    #[inline]
    pub(crate) fn check_qubit(&self, index: usize) -> Result<()> {
        if index >= self.qubit_count {
            return Err(RegisterError::QubitOutOfRange {
                index,
                qubit_count: self.qubit_count,
            });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn check_range(&self, start: usize, length: usize) -> Result<()> {
        let ok = start
            .checked_add(length)
            .map_or(false, |end| end <= self.qubit_count);
        if !ok {
            return Err(RegisterError::RangeOutOfBounds {
                start,
                length,
                qubit_count: self.qubit_count,
            });
        }
        Ok(())
    }

    /// Swap a freshly-built amplitude buffer into place.
    #[inline]
    pub(crate) fn reset_state_vec(&mut self, n_state: StateVector) {
        self.state = n_state;
    }

    /// Divide out the cached norm and flush denormal amplitudes.
    pub(crate) fn normalize_state(&mut self) {
        let norm = self.running_norm;
        self.state.normalize_by(norm);
        self.running_norm = 1.0;
    }

    /// Recompute the cached norm from the buffer.
    pub(crate) fn update_running_norm(&mut self) {
        self.running_norm = self.par.par_norm(self.state.amplitudes());
    }

    /// Apply a 2×2 matrix on the two-state subspace selected by the offset
    /// pattern: for every base index with zeros inserted at the positions
    /// in `powers_sorted`, the amplitude pair at `base | offset1` /
    /// `base | offset2` is replaced by the matrix product.
    ///
    /// `do_apply_norm` folds the deferred `1/running_norm` factor into the
    /// application; `do_calc_norm` recomputes `running_norm` afterwards.
    /// With neither, the cached norm is left untouched, which is only
    /// valid for exactly unitary matrices.
    pub(crate) fn apply_2x2(
        &mut self,
        offset1: usize,
        offset2: usize,
        matrix: &[Complex64; 4],
        powers_sorted: &[usize],
        do_apply_norm: bool,
        do_calc_norm: bool,
    ) -> Result<()> {
        if powers_sorted.len() > self.qubit_count {
            return Err(RegisterError::TooManyMasks {
                count: powers_sorted.len(),
                qubit_count: self.qubit_count,
            });
        }

        let apply_norm = do_apply_norm && self.running_norm != 1.0;

        if !apply_norm && !do_calc_norm {
            if let Some(backend) = self.backend.clone() {
                if backend.apply_2x2(
                    self.state.amplitudes_mut(),
                    matrix,
                    offset1,
                    offset2,
                    powers_sorted,
                ) {
                    return Ok(());
                }
            }
        }

        let nrm = if apply_norm {
            Complex64::new(1.0 / self.running_norm, 0.0)
        } else {
            Complex64::new(1.0, 0.0)
        };
        let mtrx = *matrix;
        let amps = SharedAmps::new(self.state.as_mut_ptr());

        self.par
            .par_for_mask(0, self.max_q_power, powers_sorted, move |base| unsafe {
                let a = amps.read(base | offset1);
                let b = amps.read(base | offset2);
                amps.write(base | offset1, nrm * (mtrx[0] * a + mtrx[1] * b));
                amps.write(base | offset2, nrm * (mtrx[2] * a + mtrx[3] * b));
            })?;

        if do_calc_norm {
            self.update_running_norm();
        } else if apply_norm {
            self.running_norm = 1.0;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CoherentUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoherentUnit")
            .field("qubit_count", &self.qubit_count)
            .field("running_norm", &self.running_norm)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn init_places_unit_amplitude_at_permutation() {
        let reg = CoherentUnit::new(4, 5).unwrap();
        let amps = reg.amplitudes();
        assert_relative_eq!(amps[5].norm(), 1.0, epsilon = 1e-12);
        for (i, amp) in amps.iter().enumerate() {
            if i != 5 {
                assert_eq!(amp.norm_sqr(), 0.0);
            }
        }
    }

    #[test]
    fn pinned_phase_is_exact() {
        let reg = CoherentUnit::with_phase(2, 3, Complex64::new(1.0, 0.0)).unwrap();
        assert_eq!(reg.amplitudes()[3], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn permutation_must_fit() {
        let err = CoherentUnit::new(2, 4).unwrap_err();
        assert_eq!(
            err,
            RegisterError::PermutationOutOfRange {
                permutation: 4,
                dimension: 4
            }
        );
    }

    #[test]
    fn capacity_is_bounded_by_machine_word() {
        assert!(CoherentUnit::new(usize::BITS as usize, 0).is_err());
    }

    #[test]
    fn try_clone_copies_state_and_shares_randomness() {
        let mut reg = CoherentUnit::with_phase(3, 6, Complex64::new(1.0, 0.0)).unwrap();
        reg.set_random_seed(99);
        let clone = reg.try_clone().unwrap();
        assert_eq!(reg.amplitudes(), clone.amplitudes());
        // The source is shared: the clone's draw advances the original's
        // sequence.
        let expected = RandomSource::from_seed(99);
        assert_eq!(clone.rand.next_double(), expected.next_double());
        assert_eq!(reg.rand.next_double(), expected.next_double());
    }

    #[test]
    fn set_amplitudes_checks_length() {
        let mut reg = CoherentUnit::new(2, 0).unwrap();
        let too_short = vec![Complex64::new(1.0, 0.0); 2];
        assert!(reg.set_amplitudes(&too_short).is_err());
    }

    #[test]
    fn set_amplitudes_refreshes_norm() {
        let mut reg = CoherentUnit::new(1, 0).unwrap();
        let amps = vec![Complex64::new(2.0, 0.0), Complex64::new(0.0, 0.0)];
        reg.set_amplitudes(&amps).unwrap();
        assert_relative_eq!(reg.running_norm(), 2.0, epsilon = 1e-12);
        let normalized = reg.normalized_state();
        assert_relative_eq!(normalized[0].norm(), 1.0, epsilon = 1e-12);
    }
}
