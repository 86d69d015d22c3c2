//! Single-qubit, controlled, and register-spanning gates
//!
//! Every gate here reduces to the `apply_2x2` kernel. A single-qubit gate
//! uses one inserted bit with offsets 0 and 2^q. A controlled gate inserts
//! the control and target bits and offsets that hold the controls at 1
//! (anti-controlled: at 0), so the matrix only touches the rows where the
//! control pattern matches.
//!
//! Dyadic rotation variants take the angle as a rational multiple of π.
//! Their sign convention is reversed from the radian operators and there
//! is no further division by two: `rt_dyad(n, d)` rotates by `+2πn/d`,
//! every other dyadic form by `−2πn/d`. The convention is load-bearing for
//! the QFT and must not be "fixed".

use crate::error::{RegisterError, Result};
use crate::matrices;
use crate::unit::{CoherentUnit, SharedAmps};
use num_complex::Complex64;
use qureg_state::StateVector;
use std::f64::consts::PI;

impl CoherentUnit {
    pub(crate) fn apply_single_bit(
        &mut self,
        qubit: usize,
        matrix: &[Complex64; 4],
        do_calc_norm: bool,
    ) -> Result<()> {
        self.check_qubit(qubit)?;
        let q_power = 1usize << qubit;
        self.apply_2x2(0, q_power, matrix, &[q_power], true, do_calc_norm)
    }

    pub(crate) fn apply_controlled_2x2(
        &mut self,
        control: usize,
        target: usize,
        matrix: &[Complex64; 4],
        do_calc_norm: bool,
    ) -> Result<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        if control == target {
            return Err(RegisterError::ControlIsTarget { index: control });
        }
        let cp = 1usize << control;
        let tp = 1usize << target;
        let mut sorted = [cp, tp];
        sorted.sort_unstable();
        self.apply_2x2(cp, cp | tp, matrix, &sorted, false, do_calc_norm)
    }

    pub(crate) fn apply_anti_controlled_2x2(
        &mut self,
        control: usize,
        target: usize,
        matrix: &[Complex64; 4],
        do_calc_norm: bool,
    ) -> Result<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        if control == target {
            return Err(RegisterError::ControlIsTarget { index: control });
        }
        let cp = 1usize << control;
        let tp = 1usize << target;
        let mut sorted = [cp, tp];
        sorted.sort_unstable();
        self.apply_2x2(0, tp, matrix, &sorted, false, do_calc_norm)
    }

    /// NOT gate (Pauli X)
    pub fn x(&mut self, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::PAULI_X, false)
    }

    /// Pauli Y
    pub fn y(&mut self, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::PAULI_Y, false)
    }

    /// Pauli Z
    pub fn z(&mut self, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::PAULI_Z, false)
    }

    /// Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::HADAMARD, true)
    }

    /// Phase shift: rotates as e^(iθ/2) around the |1⟩ state
    pub fn rt(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::phase_shift(radians), true)
    }

    /// Dyadic phase shift: rotates by +2π·n/d around |1⟩
    pub fn rt_dyad(&mut self, numerator: i64, denominator: i64, qubit: usize) -> Result<()> {
        self.rt((PI * numerator as f64 * 2.0) / denominator as f64, qubit)
    }

    /// X-axis rotation e^(-iθ/2·X)
    pub fn rx(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::rotation_x(radians), true)
    }

    /// Dyadic X-axis rotation by −2π·n/d
    pub fn rx_dyad(&mut self, numerator: i64, denominator: i64, qubit: usize) -> Result<()> {
        self.rx((-PI * numerator as f64 * 2.0) / denominator as f64, qubit)
    }

    /// Y-axis rotation e^(-iθ/2·Y)
    pub fn ry(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::rotation_y(radians), true)
    }

    /// Dyadic Y-axis rotation by −2π·n/d
    pub fn ry_dyad(&mut self, numerator: i64, denominator: i64, qubit: usize) -> Result<()> {
        self.ry((-PI * numerator as f64 * 2.0) / denominator as f64, qubit)
    }

    /// Z-axis rotation e^(-iθ/2·Z)
    pub fn rz(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single_bit(qubit, &matrices::rotation_z(radians), true)
    }

    /// Dyadic Z-axis rotation by −2π·n/d
    pub fn rz_dyad(&mut self, numerator: i64, denominator: i64, qubit: usize) -> Result<()> {
        self.rz((-PI * numerator as f64 * 2.0) / denominator as f64, qubit)
    }

    /// Controlled NOT
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::PAULI_X, false)
    }

    /// NOT applied when the control bit is zero
    pub fn anti_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_anti_controlled_2x2(control, target, &matrices::PAULI_X, false)
    }

    /// Doubly-controlled NOT (Toffoli)
    pub fn ccnot(&mut self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.check_ccnot_args(control1, control2, target)?;
        let c1 = 1usize << control1;
        let c2 = 1usize << control2;
        let tp = 1usize << target;
        let mut sorted = [c1, c2, tp];
        sorted.sort_unstable();
        self.apply_2x2(c1 | c2, c1 | c2 | tp, &matrices::PAULI_X, &sorted, false, false)
    }

    /// NOT applied when both control bits are zero
    pub fn anti_ccnot(&mut self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.check_ccnot_args(control1, control2, target)?;
        let c1 = 1usize << control1;
        let c2 = 1usize << control2;
        let tp = 1usize << target;
        let mut sorted = [c1, c2, tp];
        sorted.sort_unstable();
        self.apply_2x2(0, tp, &matrices::PAULI_X, &sorted, false, false)
    }

    fn check_ccnot_args(&self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.check_qubit(control1)?;
        self.check_qubit(control2)?;
        self.check_qubit(target)?;
        if control1 == control2 {
            return Err(RegisterError::DuplicateControl { index: control1 });
        }
        if control1 == target || control2 == target {
            return Err(RegisterError::ControlIsTarget { index: target });
        }
        Ok(())
    }

    /// Controlled Pauli Y
    pub fn cy(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::PAULI_Y, false)
    }

    /// Controlled Pauli Z
    pub fn cz(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::PAULI_Z, false)
    }

    /// Controlled phase shift around |1⟩
    pub fn crt(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::phase_shift(radians), true)
    }

    /// Controlled dyadic phase shift by −2π·n/d
    pub fn crt_dyad(
        &mut self,
        numerator: i64,
        denominator: i64,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crt(
            (-PI * numerator as f64 * 2.0) / denominator as f64,
            control,
            target,
        )
    }

    /// Controlled X-axis rotation
    pub fn crx(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::rotation_x(radians), true)
    }

    /// Controlled dyadic X-axis rotation by −2π·n/d
    pub fn crx_dyad(
        &mut self,
        numerator: i64,
        denominator: i64,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crx(
            (-PI * numerator as f64 * 2.0) / denominator as f64,
            control,
            target,
        )
    }

    /// Controlled Y-axis rotation
    pub fn cry(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::rotation_y(radians), true)
    }

    /// Controlled dyadic Y-axis rotation by −2π·n/d
    pub fn cry_dyad(
        &mut self,
        numerator: i64,
        denominator: i64,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.cry(
            (-PI * numerator as f64 * 2.0) / denominator as f64,
            control,
            target,
        )
    }

    /// Controlled Z-axis rotation
    pub fn crz(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled_2x2(control, target, &matrices::rotation_z(radians), true)
    }

    /// Controlled dyadic Z-axis rotation by −2π·n/d
    pub fn crz_dyad(
        &mut self,
        numerator: i64,
        denominator: i64,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crz(
            (-PI * numerator as f64 * 2.0) / denominator as f64,
            control,
            target,
        )
    }

    /// Swap the values of two bits
    pub fn swap(&mut self, qubit1: usize, qubit2: usize) -> Result<()> {
        self.check_qubit(qubit1)?;
        self.check_qubit(qubit2)?;
        if qubit1 == qubit2 {
            return Ok(());
        }
        let p1 = 1usize << qubit1;
        let p2 = 1usize << qubit2;
        let mut sorted = [p1, p2];
        sorted.sort_unstable();
        self.apply_2x2(p1, p2, &matrices::PAULI_X, &sorted, false, false)
    }

    /// Swap two bit ranges of equal length
    pub fn swap_reg(&mut self, start1: usize, start2: usize, length: usize) -> Result<()> {
        self.check_range(start1, length)?;
        self.check_range(start2, length)?;
        if length == 0 || start1 == start2 {
            return Ok(());
        }
        if length == 1 {
            return self.swap(start1, start2);
        }

        let distance = start1.abs_diff(start2);
        if distance < length {
            for i in 0..length {
                self.swap(start1 + i, start2 + i)?;
            }
            return Ok(());
        }

        let reg_mask = ((1usize << length) - 1) << start1;
        let reg2_mask = ((1usize << length) - 1) << start2;
        let other_mask = (self.max_q_power - 1) ^ (reg_mask | reg2_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let reg1_res = ((lcv & reg_mask) >> start1) << start2;
            let reg2_res = ((lcv & reg2_mask) >> start2) << start1;
            unsafe { dst.write(reg1_res | reg2_res | other_res, src.read(lcv)) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// NOT every bit in the range, in one pass over the state.
    ///
    /// This is the template for the register-wise operations: form a mask
    /// for the bits involved and one for the rest, then transfer each
    /// amplitude from its input permutation to the logically transformed
    /// output permutation in a fresh buffer.
    pub fn x_reg(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        if length == 1 {
            return self.x(start);
        }

        let in_out_mask = ((1usize << length) - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ in_out_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let in_out_res = !lcv & in_out_mask;
            unsafe { dst.write(in_out_res | other_res, src.read(lcv)) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Hadamard on each bit in the range
    pub fn h_reg(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.h(start + i)?;
        }
        Ok(())
    }

    /// Pauli Y on each bit in the range
    pub fn y_reg(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.y(start + i)?;
        }
        Ok(())
    }

    /// Pauli Z on each bit in the range
    pub fn z_reg(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.z(start + i)?;
        }
        Ok(())
    }

    /// Phase shift on each bit in the range
    pub fn rt_reg(&mut self, radians: f64, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rt(radians, start + i)?;
        }
        Ok(())
    }

    /// Dyadic phase shift on each bit in the range
    pub fn rt_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rt_dyad(numerator, denominator, start + i)?;
        }
        Ok(())
    }

    /// X-axis rotation on each bit in the range
    pub fn rx_reg(&mut self, radians: f64, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rx(radians, start + i)?;
        }
        Ok(())
    }

    /// Dyadic X-axis rotation on each bit in the range
    pub fn rx_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rx_dyad(numerator, denominator, start + i)?;
        }
        Ok(())
    }

    /// Y-axis rotation on each bit in the range
    pub fn ry_reg(&mut self, radians: f64, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.ry(radians, start + i)?;
        }
        Ok(())
    }

    /// Dyadic Y-axis rotation on each bit in the range
    pub fn ry_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.ry_dyad(numerator, denominator, start + i)?;
        }
        Ok(())
    }

    /// Z-axis rotation on each bit in the range
    pub fn rz_reg(&mut self, radians: f64, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rz(radians, start + i)?;
        }
        Ok(())
    }

    /// Dyadic Z-axis rotation on each bit in the range
    pub fn rz_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.rz_dyad(numerator, denominator, start + i)?;
        }
        Ok(())
    }

    /// Bit-parallel CNOT between two ranges
    pub fn cnot_reg(&mut self, control_start: usize, target_start: usize, length: usize) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        if control_start == target_start {
            return Ok(());
        }
        for i in 0..length {
            self.cnot(control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled Pauli Y across paired ranges
    pub fn cy_reg(&mut self, control_start: usize, target_start: usize, length: usize) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.cy(control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled Pauli Z across paired ranges
    pub fn cz_reg(&mut self, control_start: usize, target_start: usize, length: usize) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.cz(control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled phase shift across paired ranges
    pub fn crt_reg(
        &mut self,
        radians: f64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crt(radians, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled dyadic phase shift across paired ranges
    pub fn crt_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crt_dyad(numerator, denominator, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled X-axis rotation across paired ranges
    pub fn crx_reg(
        &mut self,
        radians: f64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crx(radians, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled dyadic X-axis rotation across paired ranges
    pub fn crx_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crx_dyad(numerator, denominator, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled Y-axis rotation across paired ranges
    pub fn cry_reg(
        &mut self,
        radians: f64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.cry(radians, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled dyadic Y-axis rotation across paired ranges
    pub fn cry_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.cry_dyad(numerator, denominator, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled Z-axis rotation across paired ranges
    pub fn crz_reg(
        &mut self,
        radians: f64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crz(radians, control_start + i, target_start + i)?;
        }
        Ok(())
    }

    /// Controlled dyadic Z-axis rotation across paired ranges
    pub fn crz_dyad_reg(
        &mut self,
        numerator: i64,
        denominator: i64,
        control_start: usize,
        target_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(control_start, length)?;
        self.check_range(target_start, length)?;
        for i in 0..length {
            self.crz_dyad(numerator, denominator, control_start + i, target_start + i)?;
        }
        Ok(())
    }
}
