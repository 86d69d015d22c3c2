//! Quantum and quantum/classical logic gates
//!
//! Built from the controlled-NOT family plus collapse-based bit
//! preparation. AND and OR need a fresh output bit: feeding an input back
//! in as the output is rejected, except for the degenerate all-same-bit
//! case, which is a no-op. XOR tolerates an input aliasing the output by
//! reducing to CNOTs; XOR of a bit with itself clears the bit.

use crate::error::{RegisterError, Result};
use crate::unit::CoherentUnit;

impl CoherentUnit {
    /// AND two qubits into an output qubit.
    pub fn and(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        if input1 == input2 && input2 == output {
            return Ok(());
        }
        if input1 == output || input2 == output {
            return Err(RegisterError::OverlappingOperands);
        }
        self.set_bit(output, false)?;
        if input1 == input2 {
            self.cnot(input1, output)
        } else {
            self.ccnot(input1, input2, output)
        }
    }

    /// OR two qubits into an output qubit.
    pub fn or(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        if input1 == input2 && input2 == output {
            return Ok(());
        }
        if input1 == output || input2 == output {
            return Err(RegisterError::OverlappingOperands);
        }
        self.set_bit(output, true)?;
        if input1 == input2 {
            self.anti_cnot(input1, output)
        } else {
            self.anti_ccnot(input1, input2, output)
        }
    }

    /// XOR two qubits into an output qubit.
    pub fn xor(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        if input1 == input2 && input2 == output {
            // x ^ x = 0.
            return self.set_bit(output, false);
        }
        if input1 == output {
            return self.cnot(input2, output);
        }
        if input2 == output {
            return self.cnot(input1, output);
        }
        self.set_bit(output, false)?;
        self.cnot(input1, output)?;
        self.cnot(input2, output)
    }

    /// AND a qubit with a classical bit into an output qubit.
    pub fn cland(&mut self, input: usize, classical_bit: bool, output: usize) -> Result<()> {
        self.check_qubit(input)?;
        if !classical_bit {
            return self.set_bit(output, false);
        }
        if input != output {
            self.set_bit(output, false)?;
            self.cnot(input, output)?;
        }
        Ok(())
    }

    /// OR a qubit with a classical bit into an output qubit.
    pub fn clor(&mut self, input: usize, classical_bit: bool, output: usize) -> Result<()> {
        self.check_qubit(input)?;
        if classical_bit {
            return self.set_bit(output, true);
        }
        if input != output {
            self.set_bit(output, false)?;
            self.cnot(input, output)?;
        }
        Ok(())
    }

    /// XOR a qubit with a classical bit into an output qubit.
    pub fn clxor(&mut self, input: usize, classical_bit: bool, output: usize) -> Result<()> {
        self.check_qubit(input)?;
        if input != output {
            self.set_bit(output, classical_bit)?;
            return self.cnot(input, output);
        }
        if classical_bit {
            return self.x(output);
        }
        Ok(())
    }

    /// Bitwise AND of two ranges into an output range.
    pub fn and_reg(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;
        if input1_start == input2_start && input2_start == output_start {
            return Ok(());
        }
        for i in 0..length {
            self.and(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise OR of two ranges into an output range.
    pub fn or_reg(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;
        if input1_start == input2_start && input2_start == output_start {
            return Ok(());
        }
        for i in 0..length {
            self.or(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise XOR of two ranges into an output range.
    pub fn xor_reg(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;
        if input1_start == input2_start && input2_start == output_start {
            for i in 0..length {
                self.set_bit(output_start + i, false)?;
            }
            return Ok(());
        }
        for i in 0..length {
            self.xor(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise AND of a range with a classical integer.
    pub fn cland_reg(
        &mut self,
        input_start: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input_start, length)?;
        self.check_range(output_start, length)?;
        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.cland(input_start + i, bit, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise OR of a range with a classical integer.
    pub fn clor_reg(
        &mut self,
        input_start: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input_start, length)?;
        self.check_range(output_start, length)?;
        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.clor(input_start + i, bit, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise XOR of a range with a classical integer.
    pub fn clxor_reg(
        &mut self,
        input_start: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input_start, length)?;
        self.check_range(output_start, length)?;
        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.clxor(input_start + i, bit, output_start + i)?;
        }
        Ok(())
    }
}
