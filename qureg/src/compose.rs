//! Register composition and decomposition
//!
//! `cohere` forms the tensor product in a fresh buffer; the incoming
//! register occupies the new high bits. `decohere` and `dispose` shrink
//! the register through a partial-trace approximation: per-subsystem
//! probabilities are accumulated exactly, while a single phase angle is
//! recorded per sub-index from the last nonzero amplitude seen. The
//! reconstruction √p·e^(iθ) therefore preserves both marginals exactly
//! and is exact (up to global phase) only when the two subsystems are not
//! entangled; for entangled inputs it yields the separable state with the
//! correct marginals. That approximation is part of the contract.

use crate::error::{RegisterError, Result};
use crate::unit::CoherentUnit;
use num_complex::Complex64;
use qureg_state::StateVector;
use rayon::prelude::*;

impl CoherentUnit {
    /// Append a copy of `other` after this register's last bit, producing
    /// the tensor product. Both operands are renormalized first; `other`
    /// is left untouched apart from that.
    pub fn cohere(&mut self, other: &mut CoherentUnit) -> Result<()> {
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
        if other.running_norm != 1.0 {
            other.normalize_state();
        }

        let n_qubit_count = self.qubit_count + other.qubit_count;
        let mut n_state = StateVector::zeroed(n_qubit_count)?;

        let start_mask = self.max_q_power - 1;
        let shift = self.qubit_count;
        let own = self.state.amplitudes();
        let incoming = other.state.amplitudes();
        n_state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                *amp = own[lcv & start_mask] * incoming[lcv >> shift];
            });

        self.qubit_count = n_qubit_count;
        self.max_q_power = n_state.dimension();
        self.reset_state_vec(n_state);
        self.update_running_norm();
        Ok(())
    }

    /// Append copies of several registers in one pass, each after the
    /// last bit of the previous.
    pub fn cohere_many(&mut self, others: &mut [CoherentUnit]) -> Result<()> {
        if self.running_norm != 1.0 {
            self.normalize_state();
        }

        let mut offsets = Vec::with_capacity(others.len());
        let mut n_qubit_count = self.qubit_count;
        for other in others.iter_mut() {
            if other.running_norm != 1.0 {
                other.normalize_state();
            }
            offsets.push(n_qubit_count);
            n_qubit_count += other.qubit_count;
        }

        let mut n_state = StateVector::zeroed(n_qubit_count)?;

        let start_mask = self.max_q_power - 1;
        let own = self.state.amplitudes();
        let incoming: Vec<(&[Complex64], usize, usize)> = others
            .iter()
            .zip(offsets.iter())
            .map(|(other, &offset)| {
                (other.state.amplitudes(), offset, other.max_q_power - 1)
            })
            .collect();

        n_state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                let mut value = own[lcv & start_mask];
                for &(amps, offset, mask) in &incoming {
                    value *= amps[(lcv >> offset) & mask];
                }
                *amp = value;
            });

        self.qubit_count = n_qubit_count;
        self.max_q_power = n_state.dimension();
        self.reset_state_vec(n_state);
        self.update_running_norm();
        Ok(())
    }

    /// Extract a contiguous window of bits into `destination`, which must
    /// already be a `length`-qubit register; this register shrinks by
    /// `length`. See the module notes for the separability contract.
    pub fn decohere(
        &mut self,
        start: usize,
        length: usize,
        destination: &mut CoherentUnit,
    ) -> Result<()> {
        if length == 0 {
            return Ok(());
        }
        self.check_range(start, length)?;
        if destination.qubit_count != length {
            return Err(RegisterError::DestinationSize {
                expected: length,
                actual: destination.qubit_count,
            });
        }

        if self.running_norm != 1.0 {
            self.normalize_state();
        }

        let (part_prob, part_angle, rem_prob, rem_angle) = self.trace_window(start, length);

        self.qubit_count -= length;
        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        self.max_q_power = n_state.dimension();
        fill_from_polar(n_state.amplitudes_mut(), &rem_prob, &rem_angle);
        self.reset_state_vec(n_state);

        fill_from_polar(destination.state.amplitudes_mut(), &part_prob, &part_angle);

        self.update_running_norm();
        destination.update_running_norm();
        Ok(())
    }

    /// Discard a contiguous window of bits, shrinking the register.
    pub fn dispose(&mut self, start: usize, length: usize) -> Result<()> {
        if length == 0 {
            return Ok(());
        }
        self.check_range(start, length)?;

        if self.running_norm != 1.0 {
            self.normalize_state();
        }

        let (_, _, rem_prob, rem_angle) = self.trace_window(start, length);

        self.qubit_count -= length;
        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        self.max_q_power = n_state.dimension();
        fill_from_polar(n_state.amplitudes_mut(), &rem_prob, &rem_angle);
        self.reset_state_vec(n_state);

        self.update_running_norm();
        Ok(())
    }

    /// Accumulate per-sub-index probabilities and representative angles
    /// for the window and for the remainder.
    fn trace_window(
        &self,
        start: usize,
        length: usize,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let part_power = 1usize << length;
        let remainder_power = self.max_q_power >> length;
        let mask = (part_power - 1) << start;
        let start_mask = (1usize << start) - 1;
        let end_mask = (self.max_q_power - 1) ^ (mask | start_mask);

        let mut part_prob = vec![0.0f64; part_power];
        let mut part_angle = vec![0.0f64; part_power];
        let mut rem_prob = vec![0.0f64; remainder_power];
        let mut rem_angle = vec![0.0f64; remainder_power];

        for (lcv, amp) in self.state.amplitudes().iter().enumerate() {
            let prob = amp.norm_sqr();
            let part_idx = (lcv & mask) >> start;
            let rem_idx = (lcv & start_mask) | ((lcv & end_mask) >> length);
            part_prob[part_idx] += prob;
            rem_prob[rem_idx] += prob;
            if prob > 0.0 {
                let angle = amp.arg();
                part_angle[part_idx] = angle;
                rem_angle[rem_idx] = angle;
            }
        }

        (part_prob, part_angle, rem_prob, rem_angle)
    }
}

fn fill_from_polar(amps: &mut [Complex64], probs: &[f64], angles: &[f64]) {
    amps.par_iter_mut()
        .zip(probs.par_iter().zip(angles.par_iter()))
        .for_each(|(amp, (&prob, &angle))| {
            *amp = Complex64::from_polar(prob.sqrt(), angle);
        });
}
