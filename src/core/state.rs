// src/core/state.rs

//! Qubit state representation: a normalized complex column vector of
//! length 2^n for a joint register of n qubits.
//!
//! The qubit count is always derived from the vector length, never stored
//! alongside it. Qubit 0 is the leftmost tensor factor, i.e. the most
//! significant bit of the basis-state index: `|b0 b1 … b(n-1)⟩` lives at
//! index `Σ b_j · 2^(n-1-j)`.

use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::core::QumatError;
use crate::core::constants::tolerances::NORM_EPSILON;
use crate::core::matrix::{ONE, ZERO};

/// A unit-norm state vector over 2^n basis states.
///
/// Construction validates both the power-of-two length and the two-norm;
/// anything that would scale the vector away from unit norm has to go
/// through the raw amplitudes and re-enter via [`QubitState::new`], which
/// re-checks the invariant.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct QubitState {
    /// The amplitudes over the computational basis, unit two-norm.
    amplitudes: Array1<Complex64>,
}

impl QubitState {
    /// Creates a state from an explicit amplitude vector.
    ///
    /// # Arguments
    /// * `amplitudes` - Length must be 2^n for some n ≥ 1 and the
    ///   two-norm must be 1 within `NORM_EPSILON`.
    ///
    /// # Returns
    /// * `Ok(state)` on success.
    /// * `Err(QumatError::StateError)` if the length or norm is invalid.
    pub fn new(amplitudes: Array1<Complex64>) -> Result<Self, QumatError> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(QumatError::StateError {
                message: format!(
                    "state vector length {} is not a power of two covering at least one qubit",
                    dim
                ),
            });
        }
        let norm_sq: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
        if (norm_sq.sqrt() - 1.0).abs() > NORM_EPSILON {
            return Err(QumatError::StateError {
                message: format!(
                    "state vector two-norm {} deviates from 1 beyond tolerance {}",
                    norm_sq.sqrt(),
                    NORM_EPSILON
                ),
            });
        }
        Ok(Self { amplitudes })
    }

    /// Creates the all-zeros basis state |0…0⟩ on `noq` qubits.
    pub fn zero(noq: usize) -> Result<Self, QumatError> {
        if noq == 0 {
            return Err(QumatError::InvalidNoq {
                message: "cannot build a state over zero qubits".to_string(),
            });
        }
        let dim = 1usize.checked_shl(noq as u32).ok_or_else(|| QumatError::InvalidNoq {
            message: format!("qubit count {} overflows the state dimension", noq),
        })?;
        let mut amplitudes = Array1::from_elem(dim, ZERO);
        amplitudes[0] = ONE;
        Ok(Self { amplitudes })
    }

    /// Creates the computational-basis state named by a bitstring literal,
    /// e.g. `"110"` for |110⟩ on three qubits.
    ///
    /// # Returns
    /// * `Err(QumatError::StateError)` if the string is empty or contains
    ///   a character other than '0' or '1'.
    pub fn from_bitstring(bits: &str) -> Result<Self, QumatError> {
        if bits.is_empty() {
            return Err(QumatError::StateError {
                message: "bitstring must name at least one qubit".to_string(),
            });
        }
        let mut index = 0usize;
        for ch in bits.chars() {
            let bit = match ch {
                '0' => 0,
                '1' => 1,
                other => {
                    return Err(QumatError::StateError {
                        message: format!("bitstring character '{}' is neither '0' nor '1'", other),
                    });
                }
            };
            index = (index << 1) | bit;
        }
        let noq = bits.len();
        let dim = 1usize.checked_shl(noq as u32).ok_or_else(|| QumatError::InvalidNoq {
            message: format!("bitstring of {} qubits overflows the state dimension", noq),
        })?;
        let mut amplitudes = Array1::from_elem(dim, ZERO);
        amplitudes[index] = ONE;
        Ok(Self { amplitudes })
    }

    /// Number of qubits addressed by this state, derived from the length.
    pub fn noq(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }

    /// Dimension of the state vector (2^noq).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Read-only access to the amplitude vector.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Probability of observing basis state `index`.
    pub fn probability_of(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map(|c| c.norm_sqr()).unwrap_or(0.0)
    }

    /// Probabilities over every basis state, in index order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Applies a full-width operator matrix to this state in place.
    /// (Internal visibility: the memory layer is the only caller.)
    pub(crate) fn apply_matrix(&mut self, operator: &Array2<Complex64>) -> Result<(), QumatError> {
        if operator.nrows() != self.dim() || operator.ncols() != self.dim() {
            return Err(QumatError::DimensionMismatch {
                message: format!(
                    "operator of shape {}x{} cannot act on a state of dimension {}",
                    operator.nrows(),
                    operator.ncols(),
                    self.dim()
                ),
            });
        }
        self.amplitudes = operator.dot(&self.amplitudes);
        Ok(())
    }

    /// Replaces the amplitudes after a measurement collapse, re-checking
    /// the unit-norm invariant. (Internal visibility.)
    pub(crate) fn replace_amplitudes(&mut self, amplitudes: Array1<Complex64>) -> Result<(), QumatError> {
        let replacement = QubitState::new(amplitudes)?;
        if replacement.dim() != self.dim() {
            return Err(QumatError::StateError {
                message: format!(
                    "replacement state dimension {} does not match current dimension {}",
                    replacement.dim(),
                    self.dim()
                ),
            });
        }
        *self = replacement;
        Ok(())
    }
}

impl fmt::Display for QubitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
