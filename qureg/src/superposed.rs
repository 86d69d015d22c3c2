//! Quantum-addressed classical memory
//!
//! These operations entangle a value register with a classical lookup
//! table addressed by an index register: for every basis state, the bytes
//! at `index * value_bytes` are assembled little-endian and loaded into
//! (or added to / subtracted from) the value register of that state. The
//! table is borrowed for the call and never mutated.
//!
//! Each operation returns the expectation value of the value register
//! over the resulting state, rounded to an unsigned byte, as a cheap
//! diagnostic readout.

use crate::error::{RegisterError, Result};
use crate::unit::{CoherentUnit, SharedAmps};
use num_complex::Complex64;
use qureg_state::StateVector;
use rayon::prelude::*;

impl CoherentUnit {
    fn check_table(
        &self,
        index_start: usize,
        index_length: usize,
        value_start: usize,
        value_length: usize,
        values: &[u8],
    ) -> Result<usize> {
        self.check_range(index_start, index_length)?;
        self.check_range(value_start, value_length)?;
        let value_bytes = (value_length + 7) / 8;
        let required = (1usize << index_length) * value_bytes;
        if values.len() < required {
            return Err(RegisterError::ValueTableTooSmall {
                required,
                actual: values.len(),
            });
        }
        Ok(value_bytes)
    }

    /// Clear the value register and load it from the table at the offset
    /// held (possibly in superposition) by the index register.
    pub fn superposed_lda(
        &mut self,
        index_start: usize,
        index_length: usize,
        value_start: usize,
        value_length: usize,
        values: &[u8],
    ) -> Result<u8> {
        let value_bytes =
            self.check_table(index_start, index_length, value_start, value_length, values)?;
        if value_length == 0 {
            return Ok(0);
        }

        self.set_reg(value_start, value_length, 0)?;

        let length_power = 1usize << value_length;
        let input_mask = ((1usize << index_length) - 1) << index_start;
        let output_mask = (length_power - 1) << value_start;
        let skip_power = 1usize << value_start;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, skip_power, value_length, move |lcv| {
                let input_int = (lcv & input_mask) >> index_start;
                let loaded = assemble(values, input_int, value_bytes) & (length_power - 1);
                unsafe { dst.write((loaded << value_start) | lcv, src.read(lcv)) };
            });

        let average = expected_value(n_state.amplitudes(), output_mask, value_start);
        self.reset_state_vec(n_state);
        Ok(round_to_byte(average))
    }

    /// Add the table entry addressed by the index register (plus carry-in)
    /// into the value register, carrying out to the carry qubit.
    pub fn superposed_adc(
        &mut self,
        index_start: usize,
        index_length: usize,
        value_start: usize,
        value_length: usize,
        carry_index: usize,
        values: &[u8],
    ) -> Result<u8> {
        let value_bytes =
            self.check_table(index_start, index_length, value_start, value_length, values)?;
        self.check_qubit(carry_index)?;
        if value_length == 0 {
            return Ok(0);
        }

        let carry_in = usize::from(self.measure_carry(carry_index)?);

        let length_power = 1usize << value_length;
        let carry_mask = 1usize << carry_index;
        let input_mask = ((1usize << index_length) - 1) << index_start;
        let output_mask = (length_power - 1) << value_start;
        let other_mask = (self.max_q_power - 1) & !(input_mask | output_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let input_res = lcv & input_mask;
                let input_int = input_res >> index_start;
                let loaded = assemble(values, input_int, value_bytes) & (length_power - 1);

                let mut output_int = ((lcv & output_mask) >> value_start) + loaded + carry_in;
                let mut carry_res = 0;
                if output_int >= length_power {
                    output_int -= length_power;
                    carry_res = carry_mask;
                }

                let output_res = output_int << value_start;
                unsafe {
                    dst.write(output_res | input_res | other_res | carry_res, src.read(lcv))
                };
            });

        let average = expected_value(n_state.amplitudes(), output_mask, value_start);
        self.reset_state_vec(n_state);
        Ok(round_to_byte(average))
    }

    /// Subtract the table entry addressed by the index register from the
    /// value register, with 6502 borrow semantics through the carry qubit
    /// (set means no borrow).
    pub fn superposed_sbc(
        &mut self,
        index_start: usize,
        index_length: usize,
        value_start: usize,
        value_length: usize,
        carry_index: usize,
        values: &[u8],
    ) -> Result<u8> {
        let value_bytes =
            self.check_table(index_start, index_length, value_start, value_length, values)?;
        self.check_qubit(carry_index)?;
        if value_length == 0 {
            return Ok(0);
        }

        // Borrow-in is the inverse of the measured carry.
        let borrow_in = usize::from(!self.measure_carry(carry_index)?);

        let length_power = 1usize << value_length;
        let carry_mask = 1usize << carry_index;
        let input_mask = ((1usize << index_length) - 1) << index_start;
        let output_mask = (length_power - 1) << value_start;
        let other_mask = (self.max_q_power - 1) & !(input_mask | output_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let input_res = lcv & input_mask;
                let input_int = input_res >> index_start;
                let loaded = assemble(values, input_int, value_bytes) & (length_power - 1);

                let mut output_int = ((lcv & output_mask) >> value_start) + length_power
                    - (loaded + borrow_in);
                let mut carry_res = 0;
                if output_int >= length_power {
                    output_int -= length_power;
                    // No borrow: the carry comes out set.
                    carry_res = carry_mask;
                }

                let output_res = output_int << value_start;
                unsafe {
                    dst.write(output_res | input_res | other_res | carry_res, src.read(lcv))
                };
            });

        let average = expected_value(n_state.amplitudes(), output_mask, value_start);
        self.reset_state_vec(n_state);
        Ok(round_to_byte(average))
    }

}

fn assemble(values: &[u8], input_int: usize, value_bytes: usize) -> usize {
    let mut out = 0usize;
    for j in 0..value_bytes {
        out |= (values[input_int * value_bytes + j] as usize) << (8 * j);
    }
    out
}

fn expected_value(amplitudes: &[Complex64], output_mask: usize, value_start: usize) -> f64 {
    amplitudes
        .par_iter()
        .enumerate()
        .map(|(i, amp)| amp.norm_sqr() * ((i & output_mask) >> value_start) as f64)
        .sum()
}

fn round_to_byte(average: f64) -> u8 {
    (average + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TABLE: [u8; 8] = [10, 20, 30, 40, 50, 60, 70, 80];

    fn pinned(qubits: usize, perm: usize) -> CoherentUnit {
        CoherentUnit::with_phase(qubits, perm, Complex64::new(1.0, 0.0)).unwrap()
    }

    #[test]
    fn lda_loads_addressed_entry() {
        // Index register holds 3; the value register receives TABLE[3].
        let mut reg = pinned(11, 3);
        let expectation = reg.superposed_lda(0, 3, 3, 8, &TABLE).unwrap();
        assert_eq!(expectation, 40);
        assert_eq!(reg.m_reg(3, 8).unwrap(), 40);
        // The index register is untouched.
        assert_eq!(reg.m_reg(0, 3).unwrap(), 3);
    }

    #[test]
    fn lda_entangles_superposed_index() {
        let mut reg = pinned(11, 0);
        reg.h_reg(0, 3).unwrap();
        reg.superposed_lda(0, 3, 3, 8, &TABLE).unwrap();
        // Measuring the index collapses the value register with it.
        let index = reg.m_reg(0, 3).unwrap();
        let value = reg.m_reg(3, 8).unwrap();
        assert_eq!(value, TABLE[index] as usize);
    }

    #[test]
    fn lda_expectation_over_uniform_index() {
        let mut reg = pinned(11, 0);
        reg.h_reg(0, 3).unwrap();
        let expectation = reg.superposed_lda(0, 3, 3, 8, &TABLE).unwrap();
        // Uniform over 10..80 averages to 45.
        assert_eq!(expectation, 45);
    }

    #[test]
    fn lda_spreads_probability_across_entries() {
        let mut reg = pinned(11, 0);
        reg.h_reg(0, 3).unwrap();
        reg.superposed_lda(0, 3, 3, 8, &TABLE).unwrap();
        let amps = reg.normalized_state();
        for (i, entry) in TABLE.iter().enumerate() {
            let perm = i | ((*entry as usize) << 3);
            assert_relative_eq!(amps[perm].norm_sqr(), 0.125, epsilon = 1e-9);
        }
    }

    #[test]
    fn adc_adds_with_carry_out() {
        // Value register starts at 200; TABLE[7] = 80 pushes it past 255.
        let mut reg = pinned(12, 7);
        reg.set_reg(3, 8, 200).unwrap();
        reg.superposed_adc(0, 3, 3, 8, 11, &TABLE).unwrap();
        assert_eq!(reg.m_reg(3, 8).unwrap(), (200 + 80) % 256);
        assert!(reg.m(11).unwrap());
    }

    #[test]
    fn adc_consumes_carry_in() {
        let mut reg = pinned(12, 2);
        reg.set_reg(3, 8, 5).unwrap();
        reg.set_bit(11, true).unwrap();
        reg.superposed_adc(0, 3, 3, 8, 11, &TABLE).unwrap();
        // 5 + TABLE[2] + 1 = 36.
        assert_eq!(reg.m_reg(3, 8).unwrap(), 36);
        assert!(!reg.m(11).unwrap());
    }

    #[test]
    fn sbc_subtracts_with_borrow_semantics() {
        // Carry set: subtract exactly, and a non-negative result leaves
        // the carry set again.
        let mut reg = pinned(12, 1);
        reg.set_reg(3, 8, 50).unwrap();
        reg.set_bit(11, true).unwrap();
        reg.superposed_sbc(0, 3, 3, 8, 11, &TABLE).unwrap();
        assert_eq!(reg.m_reg(3, 8).unwrap(), 30);
        assert!(reg.m(11).unwrap());
    }

    #[test]
    fn sbc_borrows_when_carry_clear() {
        // Carry clear: one extra is subtracted and the underflow leaves
        // the carry clear.
        let mut reg = pinned(12, 1);
        reg.set_reg(3, 8, 10).unwrap();
        reg.superposed_sbc(0, 3, 3, 8, 11, &TABLE).unwrap();
        // 10 - 20 - 1 wraps to 245.
        assert_eq!(reg.m_reg(3, 8).unwrap(), 245);
        assert!(!reg.m(11).unwrap());
    }

    #[test]
    fn table_must_cover_index_space() {
        let mut reg = pinned(11, 0);
        let short = [1u8, 2, 3];
        assert_eq!(
            reg.superposed_lda(0, 3, 3, 8, &short).unwrap_err(),
            RegisterError::ValueTableTooSmall {
                required: 8,
                actual: 3
            }
        );
    }
}
