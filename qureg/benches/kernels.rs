//! Benchmarks for the amplitude kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_complex::Complex64;
use qureg::CoherentUnit;

fn bench_single_qubit_gates(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_qubit");
    for qubits in [10usize, 14, 18] {
        group.throughput(Throughput::Elements(1u64 << qubits));
        group.bench_with_input(BenchmarkId::new("hadamard", qubits), &qubits, |b, &n| {
            let mut reg = CoherentUnit::with_phase(n, 0, Complex64::new(1.0, 0.0)).unwrap();
            b.iter(|| {
                reg.h(black_box(n / 2)).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("pauli_x", qubits), &qubits, |b, &n| {
            let mut reg = CoherentUnit::with_phase(n, 0, Complex64::new(1.0, 0.0)).unwrap();
            b.iter(|| {
                reg.x(black_box(n / 2)).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    for qubits in [10usize, 14, 18] {
        group.throughput(Throughput::Elements(1u64 << qubits));
        group.bench_with_input(BenchmarkId::new("inc", qubits), &qubits, |b, &n| {
            let mut reg = CoherentUnit::with_phase(n, 1, Complex64::new(1.0, 0.0)).unwrap();
            b.iter(|| {
                reg.inc(black_box(3), 0, n).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_qft(c: &mut Criterion) {
    let mut group = c.benchmark_group("qft");
    group.sample_size(20);
    for qubits in [8usize, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(qubits), &qubits, |b, &n| {
            let mut reg = CoherentUnit::with_phase(n, 0, Complex64::new(1.0, 0.0)).unwrap();
            b.iter(|| {
                reg.qft(0, black_box(n)).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_qubit_gates, bench_arithmetic, bench_qft);
criterion_main!(benches);
