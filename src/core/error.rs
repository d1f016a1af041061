// src/core/error.rs

//! Error handling logic

use std::fmt;

/// Error kinds surfaced by operator construction and the surrounding layers.
///
/// Every variant carries a human-readable message describing the first
/// offending constraint. Validators run before any full-width matrix is
/// allocated, so a returned error means no intermediate state was produced.
/// Nothing here is retriable; an error indicates a mis-specified operation
/// that must be fixed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum QumatError {
    /// Qubit count of the joint state is not a positive integer the
    /// engine can address.
    InvalidNoq {
        /// InvalidNoq failure message
        message: String,
    },

    /// Gate matrix is not square or its order is not a power of two.
    InvalidMatrixShape {
        /// InvalidMatrixShape failure message
        message: String,
    },

    /// Target range has lo > hi, or a bound falls outside [0, n).
    RangeInvalid {
        /// RangeInvalid failure message
        message: String,
    },

    /// A target or control index falls outside [0, n).
    IndexOutOfRange {
        /// IndexOutOfRange failure message
        message: String,
    },

    /// A control index lies inside the target window.
    ControlsOverlapTargets {
        /// ControlsOverlapTargets failure message
        message: String,
    },

    /// Two control tuples share the same index.
    ControlsDuplicate {
        /// ControlsDuplicate failure message
        message: String,
    },

    /// The target window spans the whole register, leaving no position
    /// for the supplied controls.
    ControlsCoverAll {
        /// ControlsCoverAll failure message
        message: String,
    },

    /// A control polarity is neither '0' nor '1'.
    PolarityInvalid {
        /// PolarityInvalid failure message
        message: String,
    },

    /// Gate matrix order does not match the target window dimension.
    DimensionMismatch {
        /// DimensionMismatch failure message
        message: String,
    },

    /// A target tuple was supplied with no indices.
    EmptyTargetTuple {
        /// EmptyTargetTuple failure message
        message: String,
    },

    /// No gate prototype is registered under the requested name.
    UnknownGate {
        /// UnknownGate failure message
        message: String,
    },

    /// Supplied gate parameters do not match the prototype's parameter form.
    ParameterMismatch {
        /// ParameterMismatch failure message
        message: String,
    },

    /// A state vector or register operation is inconsistent with the
    /// memory's layout (bad label, bad dimension, broken normalization).
    StateError {
        /// StateError failure message
        message: String,
    },

    /// A condition the validators should have made unreachable. Surfacing
    /// this is a bug in the engine, not a user error.
    Internal {
        /// Internal failure message
        message: String,
    },
}

impl fmt::Display for QumatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QumatError::InvalidNoq { message } => write!(f, "Invalid Qubit Count: {}", message),
            QumatError::InvalidMatrixShape { message } => write!(f, "Invalid Matrix Shape: {}", message),
            QumatError::RangeInvalid { message } => write!(f, "Invalid Target Range: {}", message),
            QumatError::IndexOutOfRange { message } => write!(f, "Index Out Of Range: {}", message),
            QumatError::ControlsOverlapTargets { message } => write!(f, "Controls Overlap Targets: {}", message),
            QumatError::ControlsDuplicate { message } => write!(f, "Duplicate Controls: {}", message),
            QumatError::ControlsCoverAll { message } => write!(f, "Controls Cover All Qubits: {}", message),
            QumatError::PolarityInvalid { message } => write!(f, "Invalid Polarity: {}", message),
            QumatError::DimensionMismatch { message } => write!(f, "Dimension Mismatch: {}", message),
            QumatError::EmptyTargetTuple { message } => write!(f, "Empty Target Tuple: {}", message),
            QumatError::UnknownGate { message } => write!(f, "Unknown Gate: {}", message),
            QumatError::ParameterMismatch { message } => write!(f, "Parameter Mismatch: {}", message),
            QumatError::StateError { message } => write!(f, "State Error: {}", message),
            QumatError::Internal { message } => write!(f, "Internal Error: {}", message),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for QumatError {}
