//! Error types for register operations

use qureg_state::StateError;
use thiserror::Error;

/// Errors raised by register operations.
///
/// Every variant is a caller bug: the operation fails fast and retrying
/// with the same arguments cannot succeed. Numerical conditions (drift,
/// denormals) are absorbed by renormalization and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Storage-layer failure (capacity, allocation, mask ordering)
    #[error(transparent)]
    State(#[from] StateError),

    /// Qubit index outside the register
    #[error("qubit index {index} out of range for {qubit_count}-qubit register")]
    QubitOutOfRange { index: usize, qubit_count: usize },

    /// Bit range extends past the end of the register
    #[error("bit range {start}+{length} out of range for {qubit_count}-qubit register")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        qubit_count: usize,
    },

    /// Permutation value outside the register's state space
    #[error("permutation {permutation} out of range for dimension {dimension}")]
    PermutationOutOfRange { permutation: usize, dimension: usize },

    /// A control bit was also the target bit
    #[error("control bit {index} cannot also be the target")]
    ControlIsTarget { index: usize },

    /// The same bit was given as two controls
    #[error("control bits cannot be the same bit (index {index})")]
    DuplicateControl { index: usize },

    /// BCD register length must be a whole number of nibbles
    #[error("BCD word bit length {length} must be a multiple of 4")]
    NonBcdLength { length: usize },

    /// More fixed-bit masks than qubits
    #[error("{count} skip masks exceed the {qubit_count}-qubit register")]
    TooManyMasks { count: usize, qubit_count: usize },

    /// Logic gate operands partially alias
    #[error("logic gate operands alias destructively")]
    OverlappingOperands,

    /// Classical value table too small for the index register
    #[error("value table holds {actual} bytes but the index register addresses {required}")]
    ValueTableTooSmall { required: usize, actual: usize },

    /// Decohere destination register has the wrong width
    #[error("destination register holds {actual} qubits, expected {expected}")]
    DestinationSize { expected: usize, actual: usize },
}

/// Result type for register operations
pub type Result<T> = std::result::Result<T, RegisterError>;
