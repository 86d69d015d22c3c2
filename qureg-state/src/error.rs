//! Error types for amplitude storage and parallel iteration

use thiserror::Error;

/// Errors that can occur at the storage layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Qubit count does not fit the machine-word permutation index
    #[error("cannot hold {qubit_count} qubits in a machine-word permutation index")]
    CapacityExceeded { qubit_count: usize },

    /// Amplitude slice length does not match the register dimension
    #[error("dimension mismatch: expected {expected} amplitudes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Memory allocation failed
    #[error("failed to allocate {size} bytes for state vector")]
    AllocationError { size: usize },

    /// Skip masks passed to `par_for_mask` were not strictly increasing
    #[error("skip masks must be strictly increasing")]
    UnorderedMasks,
}

/// Result type for storage-layer operations
pub type Result<T> = std::result::Result<T, StateError>;
