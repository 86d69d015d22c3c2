//! In-place register arithmetic
//!
//! Every operation permutes amplitudes into a fresh buffer: for each
//! source permutation, the register field is extracted, the new value is
//! computed classically, and the amplitude is written at the permutation
//! carrying the new value (negated where a signed overflow flips phase).
//!
//! Carry variants measure the carry qubit destructively up front and fold
//! the measured value into the classical operand, then iterate only the
//! carry-clear permutations with the skip iterator. For subtraction the
//! carry is a 6502-style borrow flag: measured set means "no borrow",
//! measured clear adds one to the subtrahend, and carry-out is set
//! exactly when no borrow occurred. BCD carry variants instead mirror
//! their add siblings: the carry qubit receives the top-nibble carry or
//! borrow directly.

use crate::error::{RegisterError, Result};
use crate::unit::{CoherentUnit, SharedAmps};
use qureg_state::StateVector;
use smallvec::SmallVec;

impl CoherentUnit {
    /// Measure the carry qubit, resetting it to |0⟩.
    pub(crate) fn measure_carry(&mut self, carry_index: usize) -> Result<bool> {
        let has_carry = self.m(carry_index)?;
        if has_carry {
            self.x(carry_index)?;
        }
        Ok(has_carry)
    }

    /// Add a classical integer to the register, modulo 2^length.
    pub fn inc(&mut self, to_add: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let length_power = 1usize << length;
        let to_add = to_add % length_power;
        if to_add == 0 {
            return Ok(());
        }

        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ in_out_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let in_out_int = (lcv & in_out_mask) >> start;
            let mut out_int = in_out_int + to_add;
            if out_int >= length_power {
                out_int -= length_power;
            }
            unsafe { dst.write((out_int << start) | other_res, src.read(lcv)) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Subtract a classical integer from the register, modulo 2^length.
    pub fn dec(&mut self, to_sub: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }
        let length_power = 1usize << length;
        let to_sub = to_sub % length_power;
        if to_sub == 0 {
            return Ok(());
        }

        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ in_out_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let in_out_int = (lcv & in_out_mask) >> start;
            let mut out_int = in_out_int + length_power - to_sub;
            if out_int >= length_power {
                out_int -= length_power;
            }
            unsafe { dst.write((out_int << start) | other_res, src.read(lcv)) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Add with carry-in and carry-out through the carry qubit.
    pub fn incc(
        &mut self,
        to_add: usize,
        start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(carry_index)?;
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let mut to_add = to_add % length_power;
        if self.measure_carry(carry_index)? {
            to_add += 1;
        }

        let carry_mask = 1usize << carry_index;
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ (in_out_mask | carry_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let in_out_int = (lcv & in_out_mask) >> start;
                let out_int = in_out_int + to_add;
                let out_res = if out_int < length_power {
                    (out_int << start) | other_res
                } else {
                    ((out_int - length_power) << start) | other_res | carry_mask
                };
                unsafe { dst.write(out_res, src.read(lcv)) };
            });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Subtract with borrow-in and borrow-out through the carry qubit.
    pub fn decc(
        &mut self,
        to_sub: usize,
        start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(carry_index)?;
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let mut to_sub = to_sub % length_power;
        if !self.measure_carry(carry_index)? {
            to_sub += 1;
        }

        let carry_mask = 1usize << carry_index;
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ (in_out_mask | carry_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let in_out_int = (lcv & in_out_mask) >> start;
                let out_int = in_out_int + length_power - to_sub;
                let out_res = if out_int < length_power {
                    // Borrow occurred; carry stays clear.
                    (out_int << start) | other_res
                } else {
                    ((out_int - length_power) << start) | other_res | carry_mask
                };
                unsafe { dst.write(out_res, src.read(lcv)) };
            });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Signed add without carry. The addend is given in the register's
    /// unsigned encoding with its sign bit already in place; the phase of
    /// a basis state is flipped when the add overflows and the overflow
    /// qubit is set in that state.
    pub fn incs(
        &mut self,
        to_add: usize,
        start: usize,
        length: usize,
        overflow_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(overflow_index)?;
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let to_add = to_add % length_power;
        let sign_mask = 1usize << (length - 1);
        let overflow_mask = 1usize << overflow_index;
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ in_out_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let in_out_int = (lcv & in_out_mask) >> start;
            let out_int = in_out_int + to_add;
            let out_res = if out_int < length_power {
                (out_int << start) | other_res
            } else {
                ((out_int - length_power) << start) | other_res
            };
            let is_overflow = add_overflows(in_out_int, to_add, sign_mask, length_power);
            let amp = unsafe { src.read(lcv) };
            let amp = if is_overflow && out_res & overflow_mask == overflow_mask {
                -amp
            } else {
                amp
            };
            unsafe { dst.write(out_res, amp) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Signed subtract without carry; phase flips as in
    /// [`CoherentUnit::incs`].
    pub fn decs(
        &mut self,
        to_sub: usize,
        start: usize,
        length: usize,
        overflow_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(overflow_index)?;
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let to_sub = to_sub % length_power;
        let sign_mask = 1usize << (length - 1);
        let overflow_mask = 1usize << overflow_index;
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ in_out_mask;

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par.par_for(0, self.max_q_power, move |lcv| {
            let other_res = lcv & other_mask;
            let in_out_int = (lcv & in_out_mask) >> start;
            let mut out_int = in_out_int + length_power - to_sub;
            if out_int >= length_power {
                out_int -= length_power;
            }
            let out_res = (out_int << start) | other_res;
            let is_overflow = sub_overflows(in_out_int, to_sub, sign_mask, length_power);
            let amp = unsafe { src.read(lcv) };
            let amp = if is_overflow && out_res & overflow_mask == overflow_mask {
                -amp
            } else {
                amp
            };
            unsafe { dst.write(out_res, amp) };
        });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Signed add with carry. With an overflow qubit the phase flips only
    /// in states where that qubit is set; with `None` it flips on every
    /// overflowing basis state.
    pub fn incsc(
        &mut self,
        to_add: usize,
        start: usize,
        length: usize,
        overflow_index: Option<usize>,
        carry_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(carry_index)?;
        if let Some(overflow) = overflow_index {
            self.check_qubit(overflow)?;
        }
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let mut to_add = to_add % length_power;
        if self.measure_carry(carry_index)? {
            to_add += 1;
        }
        let to_add = to_add;

        let sign_mask = 1usize << (length - 1);
        let carry_mask = 1usize << carry_index;
        let overflow_mask = overflow_index.map(|i| 1usize << i);
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ (in_out_mask | carry_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let in_out_int = (lcv & in_out_mask) >> start;
                let out_int = in_out_int + to_add;
                let out_res = if out_int < length_power {
                    (out_int << start) | other_res
                } else {
                    ((out_int - length_power) << start) | other_res | carry_mask
                };
                let is_overflow = add_overflows(in_out_int, to_add, sign_mask, length_power);
                let flip = is_overflow
                    && overflow_mask.map_or(true, |mask| out_res & mask == mask);
                let amp = unsafe { src.read(lcv) };
                unsafe { dst.write(out_res, if flip { -amp } else { amp }) };
            });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Signed subtract with carry; flip rules as in
    /// [`CoherentUnit::incsc`], borrow convention as in
    /// [`CoherentUnit::decc`].
    pub fn decsc(
        &mut self,
        to_sub: usize,
        start: usize,
        length: usize,
        overflow_index: Option<usize>,
        carry_index: usize,
    ) -> Result<()> {
        self.check_range(start, length)?;
        self.check_qubit(carry_index)?;
        if let Some(overflow) = overflow_index {
            self.check_qubit(overflow)?;
        }
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let mut to_sub = to_sub % length_power;
        if !self.measure_carry(carry_index)? {
            to_sub += 1;
        }
        let to_sub = to_sub;

        let sign_mask = 1usize << (length - 1);
        let carry_mask = 1usize << carry_index;
        let overflow_mask = overflow_index.map(|i| 1usize << i);
        let in_out_mask = (length_power - 1) << start;
        let other_mask = (self.max_q_power - 1) ^ (in_out_mask | carry_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());
        self.par
            .par_for_skip(0, self.max_q_power, carry_mask, 1, move |lcv| {
                let other_res = lcv & other_mask;
                let in_out_int = (lcv & in_out_mask) >> start;
                let out_int = in_out_int + length_power - to_sub;
                let out_res = if out_int < length_power {
                    (out_int << start) | other_res
                } else {
                    ((out_int - length_power) << start) | other_res | carry_mask
                };
                let is_overflow = sub_overflows(in_out_int, to_sub, sign_mask, length_power);
                let flip = is_overflow
                    && overflow_mask.map_or(true, |mask| out_res & mask == mask);
                let amp = unsafe { src.read(lcv) };
                unsafe { dst.write(out_res, if flip { -amp } else { amp }) };
            });
        self.reset_state_vec(n_state);
        Ok(())
    }

    /// Add a decimal integer to a binary-coded-decimal register. Basis
    /// states holding an invalid nibble (> 9) are left untouched.
    pub fn incbcd(&mut self, to_add: usize, start: usize, length: usize) -> Result<()> {
        self.bcd_kernel(to_add, start, length, None, BcdOp::Add)
    }

    /// Subtract a decimal integer from a BCD register.
    pub fn decbcd(&mut self, to_sub: usize, start: usize, length: usize) -> Result<()> {
        self.bcd_kernel(to_sub, start, length, None, BcdOp::Sub)
    }

    /// BCD add with carry: carry-in is measured and added, top-nibble
    /// carry goes out to the carry qubit.
    pub fn incbcdc(
        &mut self,
        to_add: usize,
        start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.check_qubit(carry_index)?;
        let mut to_add = to_add;
        if self.measure_carry(carry_index)? {
            to_add += 1;
        }
        self.bcd_kernel(to_add, start, length, Some(carry_index), BcdOp::Add)
    }

    /// BCD subtract with carry: carry-in is measured and subtracted,
    /// top-nibble borrow goes out to the carry qubit.
    pub fn decbcdc(
        &mut self,
        to_sub: usize,
        start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.check_qubit(carry_index)?;
        let mut to_sub = to_sub;
        if self.measure_carry(carry_index)? {
            to_sub += 1;
        }
        self.bcd_kernel(to_sub, start, length, Some(carry_index), BcdOp::Sub)
    }

    fn bcd_kernel(
        &mut self,
        operand: usize,
        start: usize,
        length: usize,
        carry_index: Option<usize>,
        op: BcdOp,
    ) -> Result<()> {
        self.check_range(start, length)?;
        let nibble_count = length / 4;
        if nibble_count * 4 != length {
            return Err(RegisterError::NonBcdLength { length });
        }
        if length == 0 {
            return Ok(());
        }

        let in_out_mask = ((1usize << length) - 1) << start;
        let carry_mask = carry_index.map_or(0, |i| 1usize << i);
        let other_mask = (self.max_q_power - 1) ^ (in_out_mask | carry_mask);

        let mut n_state = StateVector::zeroed(self.qubit_count)?;
        let dst = SharedAmps::new(n_state.as_mut_ptr());
        let src = SharedAmps::new(self.state.as_mut_ptr());

        let body = move |lcv: usize| {
            let other_res = lcv & other_mask;
            let in_out_int = (lcv & in_out_mask) >> start;
            let mut part_operand = operand;
            let mut nibbles: SmallVec<[i8; 16]> = SmallVec::new();
            let mut is_valid = true;
            for j in 0..nibble_count {
                let digit = ((in_out_int >> (j * 4)) & 15) as i8;
                let operand_digit = (part_operand % 10) as i8;
                part_operand /= 10;
                nibbles.push(match op {
                    BcdOp::Add => digit + operand_digit,
                    BcdOp::Sub => digit - operand_digit,
                });
                if digit > 9 {
                    is_valid = false;
                }
            }

            if !is_valid {
                unsafe { dst.write(lcv, src.read(lcv)) };
                return;
            }

            let mut out_int = 0usize;
            let mut carry_res = 0usize;
            for j in 0..nibble_count {
                match op {
                    BcdOp::Add => {
                        if nibbles[j] > 9 {
                            nibbles[j] -= 10;
                            if j + 1 < nibble_count {
                                nibbles[j + 1] += 1;
                            } else {
                                carry_res = carry_mask;
                            }
                        }
                    }
                    BcdOp::Sub => {
                        if nibbles[j] < 0 {
                            nibbles[j] += 10;
                            if j + 1 < nibble_count {
                                nibbles[j + 1] -= 1;
                            } else {
                                carry_res = carry_mask;
                            }
                        }
                    }
                }
                out_int |= (nibbles[j] as usize) << (j * 4);
            }
            let out_res = (out_int << start) | other_res | carry_res;
            unsafe { dst.write(out_res, src.read(lcv)) };
        };

        match carry_index {
            Some(_) => {
                self.par
                    .par_for_skip(0, self.max_q_power, carry_mask, 1, body);
            }
            None => self.par.par_for(0, self.max_q_power, body),
        }
        self.reset_state_vec(n_state);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum BcdOp {
    Add,
    Sub,
}

/// Signed-add overflow: both operands negative and the magnitudes' sum
/// exceeds the sign boundary, or both positive and the sum reaches it.
#[inline]
fn add_overflows(in_out: usize, operand: usize, sign_mask: usize, length_power: usize) -> bool {
    if in_out & operand & sign_mask != 0 {
        let a = (!in_out & (length_power - 1)) + 1;
        let b = (!operand & (length_power - 1)) + 1;
        a + b > sign_mask
    } else if !in_out & !operand & sign_mask != 0 {
        in_out + operand >= sign_mask
    } else {
        false
    }
}

/// Signed-subtract overflow: operands of differing sign whose combined
/// magnitude crosses the sign boundary.
#[inline]
fn sub_overflows(in_out: usize, operand: usize, sign_mask: usize, length_power: usize) -> bool {
    if in_out & !operand & sign_mask != 0 {
        let a = (!in_out & (length_power - 1)) + 1;
        a + operand > sign_mask
    } else if !in_out & operand & sign_mask != 0 {
        let b = (!operand & (length_power - 1)) + 1;
        in_out + b >= sign_mask
    } else {
        false
    }
}
