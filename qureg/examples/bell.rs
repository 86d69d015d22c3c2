//! Prepare and repeatedly measure a Bell pair.

use qureg::{CoherentUnit, RandomSource};

fn main() {
    let source = RandomSource::new();
    let mut matches = 0;
    let shots = 100;

    for _ in 0..shots {
        let mut reg = CoherentUnit::with_random_source(2, 0, source.clone()).unwrap();
        reg.h(0).unwrap();
        reg.cnot(0, 1).unwrap();
        let a = reg.m(0).unwrap();
        let b = reg.m(1).unwrap();
        if a == b {
            matches += 1;
        }
    }

    println!("correlated outcomes: {matches}/{shots}");
}
