//! Load a classical table into a register superposed over every address.

use qureg::CoherentUnit;

fn main() {
    let table: [u8; 8] = [10, 20, 30, 40, 50, 60, 70, 80];

    // 3 index qubits, 8 value qubits.
    let mut reg = CoherentUnit::new(11, 0).unwrap();
    reg.h_reg(0, 3).unwrap();
    let expectation = reg.superposed_lda(0, 3, 3, 8, &table).unwrap();
    println!("expectation over the superposed load: {expectation}");

    let index = reg.m_reg(0, 3).unwrap();
    let value = reg.m_reg(3, 8).unwrap();
    println!("collapsed to table[{index}] = {value}");
}
