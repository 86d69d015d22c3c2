//! Dense state-vector simulation of universal quantum registers
//!
//! A [`CoherentUnit`] holds the 2^n complex amplitudes of an n-qubit
//! register and exposes unitary gates, measurement with coherent
//! collapse, register composition and decomposition, in-place arithmetic
//! with carry and overflow semantics, and superposed loads from classical
//! memory.
//!
//! # Example
//!
//! ```
//! use qureg::CoherentUnit;
//!
//! // An 8-bit register holding 5, incremented by 3.
//! let mut reg = CoherentUnit::new(8, 5).unwrap();
//! reg.inc(3, 0, 8).unwrap();
//! assert_eq!(reg.m_reg(0, 8).unwrap(), 8);
//! ```
//!
//! # Normalization
//!
//! Gate kernels track the state's L2 norm lazily in a running norm;
//! renormalization (with denormal-amplitude cleanup) happens before any
//! operation whose answer depends on absolute probability. Measurement
//! deliberately multiplies collapsed states by a random global phase:
//! global phase is unobservable, and randomizing it surfaces code that
//! accidentally relies on it.
//!
//! # Concurrency
//!
//! Kernels run on a per-call worker pool fed by an atomic index counter
//! (see [`qureg_state::ParallelFor`]), with rayon handling contiguous
//! sweeps and reductions. Operations on one register are strictly
//! ordered; bodies within one kernel are not.

mod arith;
mod backend;
mod compose;
mod error;
mod gates;
mod logic;
mod matrices;
mod measure;
mod random;
mod superposed;
mod transforms;
mod unit;

pub use backend::Accelerator;
pub use error::{RegisterError, Result};
pub use random::RandomSource;
pub use unit::CoherentUnit;

pub use qureg_state::{Amplitude, ParallelFor, StateVector};
