//! Accelerator delegation contract

use approx::assert_relative_eq;
use num_complex::Complex64;
use qureg::{Accelerator, CoherentUnit, RandomSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Reference device: a serial re-implementation of the 2×2 kernel that
/// counts how often it was invoked.
struct MirrorDevice {
    calls: AtomicUsize,
}

impl MirrorDevice {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Accelerator for MirrorDevice {
    fn apply_2x2(
        &self,
        amplitudes: &mut [Complex64],
        matrix: &[Complex64; 4],
        offset1: usize,
        offset2: usize,
        powers_sorted: &[usize],
    ) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        for base in 0..amplitudes.len() {
            if powers_sorted.iter().any(|&p| base & p != 0) {
                continue;
            }
            let a = amplitudes[base | offset1];
            let b = amplitudes[base | offset2];
            amplitudes[base | offset1] = matrix[0] * a + matrix[1] * b;
            amplitudes[base | offset2] = matrix[2] * a + matrix[3] * b;
        }
        true
    }
}

/// Device that declines every call.
struct DecliningDevice;

impl Accelerator for DecliningDevice {
    fn apply_2x2(
        &self,
        _amplitudes: &mut [Complex64],
        _matrix: &[Complex64; 4],
        _offset1: usize,
        _offset2: usize,
        _powers_sorted: &[usize],
    ) -> bool {
        false
    }
}

fn run_circuit(reg: &mut CoherentUnit) {
    reg.x(0).unwrap();
    reg.cnot(0, 2).unwrap();
    reg.swap(1, 2).unwrap();
    reg.ccnot(0, 1, 3).unwrap();
}

#[test]
fn delegated_kernels_match_cpu_kernels() {
    let device = Arc::new(MirrorDevice::new());
    let mut accelerated = CoherentUnit::with_parts(
        4,
        0,
        Some(Complex64::new(1.0, 0.0)),
        RandomSource::from_seed(1),
        Some(device.clone()),
    )
    .unwrap();
    let mut cpu =
        CoherentUnit::with_phase(4, 0, Complex64::new(1.0, 0.0)).unwrap();

    run_circuit(&mut accelerated);
    run_circuit(&mut cpu);

    assert!(device.calls.load(Ordering::Relaxed) > 0);
    let a = accelerated.normalized_state();
    let b = cpu.normalized_state();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
        assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
    }
}

#[test]
fn norm_tracking_kernels_stay_on_cpu() {
    let device = Arc::new(MirrorDevice::new());
    let mut reg = CoherentUnit::with_parts(
        2,
        0,
        None,
        RandomSource::from_seed(2),
        Some(device.clone()),
    )
    .unwrap();
    // H recalculates the running norm, so it must not delegate.
    reg.h(0).unwrap();
    assert_eq!(device.calls.load(Ordering::Relaxed), 0);
    assert_relative_eq!(reg.prob(0).unwrap(), 0.5, epsilon = 1e-9);
}

#[test]
fn declined_calls_fall_back_to_cpu() {
    let mut reg = CoherentUnit::with_parts(
        4,
        0,
        Some(Complex64::new(1.0, 0.0)),
        RandomSource::from_seed(3),
        Some(Arc::new(DecliningDevice)),
    )
    .unwrap();
    run_circuit(&mut reg);
    let mut cpu = CoherentUnit::with_phase(4, 0, Complex64::new(1.0, 0.0)).unwrap();
    run_circuit(&mut cpu);
    assert_eq!(reg.normalized_state(), cpu.normalized_state());
}
