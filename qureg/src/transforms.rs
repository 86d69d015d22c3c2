//! Shifts, rotations, the quantum Fourier transform, and phase flips
//!
//! Rotations and shifts are register-value permutations and run through
//! the shadow-buffer kernel like the arithmetic ops. The QFT is composed
//! from Hadamards and controlled dyadic phase shifts; the dyadic sign
//! convention is what makes this the forward transform, and mirroring it
//! yields the inverse.

use crate::error::Result;
use crate::unit::{CoherentUnit, SharedAmps};
use qureg_state::StateVector;
use rayon::prelude::*;

impl CoherentUnit {
    /// Rotate the register's bits left cyclically.
    pub fn rol(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let shift = shift % length;
        if shift == 0 {
            return Ok(());
        }
        self.rotate_kernel(start, length, shift)
    }

    /// Rotate the register's bits right cyclically.
    pub fn ror(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let shift = shift % length;
        if shift == 0 {
            return Ok(());
        }
        self.rotate_kernel(start, length, length - shift)
    }

    fn rotate_kernel(&mut self, start: usize, length: usize, left_shift: usize) -> Result<()> {
        let length_power = 1usize << length;
        let reg_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ reg_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let reg_int = (lcv & reg_mask) >> start;
            let out_int =
                ((reg_int << left_shift) & (length_power - 1)) | (reg_int >> (length - left_shift));
            unsafe { dst.write((out_int << start) | other_res, src.read(lcv)) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Logical shift left, filling freed low bits with |0⟩.
    pub fn lsl(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }
        if shift >= length {
            return self.set_reg(start, length, 0);
        }
        self.rol(shift, start, length)?;
        self.set_reg(start, shift, 0)
    }

    /// Logical shift right, filling freed high bits with |0⟩.
    pub fn lsr(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }
        if shift >= length {
            return self.set_reg(start, length, 0);
        }
        self.ror(shift, start, length)?;
        self.set_reg(start + length - shift, shift, 0)
    }

    /// Arithmetic shift left, treating the top two bits as sign and carry.
    pub fn asl(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }
        if shift >= length {
            return self.set_reg(start, length, 0);
        }
        let end = start + length;
        self.swap(end - 1, end - 2)?;
        self.rol(shift, start, length)?;
        self.swap(end - 1, end - 2)?;
        self.set_reg(start, shift, 0)
    }

    /// Arithmetic shift right, treating the top two bits as sign and carry.
    pub fn asr(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }
        if shift >= length {
            return self.set_reg(start, length, 0);
        }
        let end = start + length;
        self.swap(end - 1, end - 2)?;
        self.ror(shift, start, length)?;
        self.swap(end - 1, end - 2)?;
        self.set_reg(end - shift, shift, 0)
    }

    /// Quantum Fourier transform over the register.
    pub fn qft(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let end = start + length;
        for i in start..end {
            self.h(i)?;
            for j in 1..(end - i) {
                self.crt_dyad(1, 1i64 << j, i + j, i)?;
            }
        }
        Ok(())
    }

    /// Flip the phase of every state where the register reads zero.
    pub fn zero_phase_flip(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let reg_mask = ((1usize << length) - 1) << start;
        self.state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                if lcv & reg_mask == 0 {
                    *amp = -*amp;
                }
            });
        Ok(())
    }

    /// Flip the phase of every state where the register reads less than
    /// `greater_perm` and the flag qubit is set. This is the carry-flag
    /// comparison idiom of 6502-style CMP.
    pub fn c_phase_flip_if_less(
        &mut self,
        greater_perm: usize,
        start: usize,
        length: usize,
        flag_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(flag_index)?;
        let reg_mask = ((1usize << length) - 1) << start;
        let flag_mask = 1usize << flag_index;
        self.state
            .amplitudes_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(lcv, amp)| {
                if (lcv & reg_mask) >> start < greater_perm && lcv & flag_mask == flag_mask {
                    *amp = -*amp;
                }
            });
        Ok(())
    }

    /// Flip the phase of every amplitude.
    pub fn phase_flip(&mut self) {
        self.state
            .amplitudes_mut()
            .par_iter_mut()
            .for_each(|amp| *amp = -*amp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn pinned(qubits: usize, perm: usize) -> CoherentUnit {
        CoherentUnit::with_phase(qubits, perm, Complex64::new(1.0, 0.0)).unwrap()
    }

    // Inverse QFT: the mirrored composition with the dyadic sign undone.
    fn inverse_qft(reg: &mut CoherentUnit, start: usize, length: usize) {
        let end = start + length;
        for i in (start..end).rev() {
            for j in (1..(end - i)).rev() {
                reg.crt_dyad(-1, 1i64 << j, i + j, i).unwrap();
            }
            reg.h(i).unwrap();
        }
    }

    #[test]
    fn rol_rotates_register_bits() {
        let mut reg = pinned(6, 0b001001);
        reg.rol(1, 0, 6).unwrap();
        assert_eq!(reg.m_reg(0, 6).unwrap(), 0b010010);
    }

    #[test]
    fn rol_wraps_top_bit() {
        let mut reg = pinned(4, 0b1000);
        reg.rol(1, 0, 4).unwrap();
        assert_eq!(reg.m_reg(0, 4).unwrap(), 0b0001);
    }

    #[test]
    fn ror_then_rol_round_trips() {
        let mut reg = pinned(8, 0b10110101);
        reg.ror(3, 0, 8).unwrap();
        reg.rol(3, 0, 8).unwrap();
        assert_eq!(reg.m_reg(0, 8).unwrap(), 0b10110101);
    }

    #[test]
    fn rotation_on_inner_window() {
        let mut reg = pinned(8, 0b01_0110_01);
        reg.rol(2, 2, 4).unwrap();
        // Window bits 2..6 (0110) rotate to 1001; bits outside stay put.
        assert_eq!(reg.m_reg(0, 8).unwrap(), 0b01_1001_01);
    }

    #[test]
    fn shift_modulo_length() {
        let mut reg = pinned(4, 0b0110);
        reg.rol(4, 0, 4).unwrap();
        assert_eq!(reg.m_reg(0, 4).unwrap(), 0b0110);
    }

    #[test]
    fn lsl_fills_with_zero() {
        let mut reg = pinned(6, 0b101101);
        reg.lsl(2, 0, 6).unwrap();
        assert_eq!(reg.m_reg(0, 6).unwrap(), 0b110100);
    }

    #[test]
    fn lsr_fills_with_zero() {
        let mut reg = pinned(6, 0b101101);
        reg.lsr(2, 0, 6).unwrap();
        assert_eq!(reg.m_reg(0, 6).unwrap(), 0b001011);
    }

    #[test]
    fn oversized_shift_clears_register() {
        let mut reg = pinned(4, 0b1111);
        reg.lsl(4, 0, 4).unwrap();
        assert_eq!(reg.m_reg(0, 4).unwrap(), 0);
    }

    #[test]
    fn asl_preserves_top_two_bits_order() {
        let mut reg = pinned(6, 0b000011);
        reg.asl(1, 0, 6).unwrap();
        assert_eq!(reg.m_reg(0, 6).unwrap(), 0b000110);
    }

    #[test]
    fn qft_spreads_zero_state_uniformly() {
        let mut reg = CoherentUnit::new(4, 0).unwrap();
        reg.qft(0, 4).unwrap();
        for perm in 0..16 {
            assert_relative_eq!(reg.prob_all(perm).unwrap(), 1.0 / 16.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn qft_inverse_round_trips() {
        let mut reg = pinned(4, 0b0110);
        reg.qft(0, 4).unwrap();
        inverse_qft(&mut reg, 0, 4);
        assert_relative_eq!(reg.prob_all(0b0110).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn qft_inverse_round_trips_superposition() {
        let mut reg = CoherentUnit::new(5, 3).unwrap();
        reg.h(4).unwrap();
        let before = reg.normalized_state();
        reg.qft(0, 4).unwrap();
        inverse_qft(&mut reg, 0, 4);
        let after = reg.normalized_state();
        // Equal up to global phase: compare via the overlap magnitude.
        let overlap: Complex64 = before
            .iter()
            .zip(after.iter())
            .map(|(a, b)| a.conj() * b)
            .sum();
        assert_relative_eq!(overlap.norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_phase_flip_negates_zero_register_only() {
        let mut reg = CoherentUnit::new(3, 0).unwrap();
        reg.h(0).unwrap();
        let before = reg.normalized_state();
        reg.zero_phase_flip(0, 2).unwrap();
        let after = reg.normalized_state();
        assert_relative_eq!((after[0] + before[0]).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!((after[1] - before[1]).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn phase_flip_negates_everything() {
        let mut reg = pinned(2, 1);
        reg.phase_flip();
        assert_eq!(reg.amplitudes()[1], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn conditional_flip_requires_flag_and_comparison() {
        // Register value 2 < 5 with flag set: flipped.
        let mut reg = pinned(5, 0b10010);
        reg.c_phase_flip_if_less(5, 0, 4, 4).unwrap();
        assert_eq!(reg.amplitudes()[0b10010], Complex64::new(-1.0, 0.0));

        // Flag clear: untouched.
        let mut reg = pinned(5, 0b00010);
        reg.c_phase_flip_if_less(5, 0, 4, 4).unwrap();
        assert_eq!(reg.amplitudes()[0b00010], Complex64::new(1.0, 0.0));

        // Value not less: untouched.
        let mut reg = pinned(5, 0b10111);
        reg.c_phase_flip_if_less(5, 0, 4, 4).unwrap();
        assert_eq!(reg.amplitudes()[0b10111], Complex64::new(1.0, 0.0));
    }
}
