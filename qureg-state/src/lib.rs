//! Amplitude storage and parallel iteration for dense quantum registers
//!
//! This crate holds the two low-level building blocks of the `qureg`
//! simulator:
//!
//! - [`StateVector`]: an exclusively-owned, 64-byte-aligned buffer of
//!   2^n complex amplitudes indexed by permutation integer.
//! - [`ParallelFor`]: data-parallel iteration over the permutation basis,
//!   including the skip/mask variants that hold chosen bits fixed at zero
//!   while iterating all remaining combinations.
//!
//! Both are storage-level primitives: they know nothing about gates or
//! measurement. The register layer in the `qureg` crate composes them into
//! the actual quantum operations.

pub mod error;
pub mod parallel;
pub mod state_vector;

pub use error::{Result, StateError};
pub use parallel::ParallelFor;
pub use state_vector::StateVector;

/// Complex amplitude on a permutation basis state.
pub type Amplitude = num_complex::Complex64;
