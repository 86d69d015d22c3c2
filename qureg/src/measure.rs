//! Measurement, probability readout, and collapse-based preparation
//!
//! Measurement renormalizes lazily, samples from the induced distribution,
//! zeroes every amplitude inconsistent with the outcome, and scales the
//! survivors by e^(iφ)/√q for the retained probability q and a fresh
//! random phase φ. The random phase is deliberate: the global phase of a
//! post-measurement state is unobservable, so it is actively scrambled to
//! expose code that mistakenly depends on it.
//!
//! All random draws happen on the calling thread, outside the parallel
//! sweeps, so a seeded source replays identically.

use crate::error::{RegisterError, Result};
use crate::unit::CoherentUnit;
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

impl CoherentUnit {
    /// Probability of reading the qubit as |1⟩
    pub fn prob(&mut self, qubit: usize) -> Result<f64> {
        self.check_qubit(qubit)?;
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
        let q_power = 1usize << qubit;
        Ok(self
            .state
            .amplitudes()
            .par_iter()
            .enumerate()
            .map(|(lcv, amp)| {
                if lcv & q_power != 0 {
                    amp.norm_sqr()
                } else {
                    0.0
                }
            })
            .sum())
    }

    /// Probability of the full register being in the given permutation
    pub fn prob_all(&mut self, permutation: usize) -> Result<f64> {
        if permutation >= self.max_q_power {
            return Err(RegisterError::PermutationOutOfRange {
                permutation,
                dimension: self.max_q_power,
            });
        }
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
        Ok(self.state.amplitudes()[permutation].norm_sqr())
    }

    /// Fill `out[k]` with the probability of permutation `k`
    pub fn prob_array(&mut self, out: &mut [f64]) -> Result<()> {
        if out.len() != self.max_q_power {
            return Err(RegisterError::State(
                qureg_state::StateError::DimensionMismatch {
                    expected: self.max_q_power,
                    actual: out.len(),
                },
            ));
        }
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
        out.par_iter_mut()
            .zip(self.state.amplitudes().par_iter())
            .for_each(|(p, amp)| *p = amp.norm_sqr());
        Ok(())
    }

    /// Measure one qubit, collapsing the register.
    pub fn m(&mut self, qubit: usize) -> Result<bool> {
        self.check_qubit(qubit)?;
        if self.running_norm != 1.0 {
            self.normalize_state();
        }

        let draw = self.rand.next_double();
        let angle = self.rand.next_double() * 2.0 * PI;

        let q_power = 1usize << qubit;
        let one_chance = self.prob(qubit)?;
        let result = draw < one_chance && one_chance > 0.0;

        let retained = if result { one_chance } else { 1.0 - one_chance };
        let nrm = Complex64::from_polar(1.0, angle) / retained.sqrt();

        self.state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                if (lcv & q_power != 0) == result {
                    *amp *= nrm;
                } else {
                    *amp = Complex64::new(0.0, 0.0);
                }
            });
        self.running_norm = 1.0;

        Ok(result)
    }

    /// Measure a contiguous register, collapsing to the sampled value.
    ///
    /// The outcome distribution is accumulated on the heap, the outcome is
    /// drawn by cumulative comparison, and numerical drift that prevents
    /// selection falls back to the largest-probability outcome.
    pub fn m_reg(&mut self, start: usize, length: usize) -> Result<usize> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(0);
        }
        if length == 1 {
            return Ok(self.m(start)? as usize);
        }

        if self.running_norm != 1.0 {
            self.normalize_state();
        }

        let draw = self.rand.next_double();
        let angle = self.rand.next_double() * 2.0 * PI;

        let length_power = 1usize << length;
        let reg_mask = (length_power - 1) << start;

        let mut prob_dist = vec![0.0f64; length_power];
        for (lcv, amp) in self.state.amplitudes().iter().enumerate() {
            prob_dist[(lcv & reg_mask) >> start] += amp.norm_sqr();
        }

        let mut result = length_power - 1;
        let mut retained = prob_dist[result];
        let mut largest = 0.0;
        let mut cumulative = 0.0;
        for (outcome, &p) in prob_dist.iter().enumerate() {
            if cumulative + p > draw {
                result = outcome;
                retained = p;
                break;
            }
            // Track the most probable outcome; if drift keeps the
            // cumulative sum below the draw, it is the fallback.
            if largest <= p {
                largest = p;
                result = outcome;
                retained = p;
            }
            cumulative += p;
        }

        let result_res = result << start;
        let nrm = Complex64::from_polar(1.0, angle) / retained.sqrt();

        self.state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                if lcv & reg_mask == result_res {
                    *amp *= nrm;
                } else {
                    *amp = Complex64::new(0.0, 0.0);
                }
            });
        self.running_norm = 1.0;

        Ok(result)
    }

    /// Measure a fixed 8-bit register
    pub fn m_reg8(&mut self, start: usize) -> Result<u8> {
        Ok(self.m_reg(start, 8)? as u8)
    }

    /// Collapse one bit to a pure |0⟩ or |1⟩ state
    pub fn set_bit(&mut self, qubit: usize, value: bool) -> Result<()> {
        if self.m(qubit)? != value {
            self.x(qubit)?;
        }
        Ok(())
    }

    /// Collapse a register range to the given classical value
    pub fn set_reg(&mut self, start: usize, length: usize, value: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        if length == 1 {
            return self.set_bit(start, value & 1 == 1);
        }

        if start == 0 && length == self.qubit_count {
            // Whole-register set: rebuild the pure permutation state with
            // a fresh random global phase.
            if value >= self.max_q_power {
                return Err(RegisterError::PermutationOutOfRange {
                    permutation: value,
                    dimension: self.max_q_power,
                });
            }
            let angle = self.rand.next_double() * 2.0 * PI;
            self.running_norm = 1.0;
            let amps = self.state.amplitudes_mut();
            amps.fill(Complex64::new(0.0, 0.0));
            amps[value] = Complex64::from_polar(1.0, angle);
            return Ok(());
        }

        if value >= 1usize << length {
            return Err(RegisterError::PermutationOutOfRange {
                permutation: value,
                dimension: 1usize << length,
            });
        }
        let measured = self.m_reg(start, length)?;
        for i in 0..length {
            if (measured >> i) & 1 != (value >> i) & 1 {
                self.x(start + i)?;
            }
        }
        Ok(())
    }

    /// Collapse the whole register to a pure permutation state
    pub fn set_permutation(&mut self, permutation: usize) -> Result<()> {
        self.set_reg(0, self.qubit_count, permutation)
    }
}
