// src/validation/mod.rs

//! Checks on states and produced operator matrices with
//! caller-overridable tolerances.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::matrix::is_unitary;
use crate::core::{QubitState, QumatError};

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-13;
const DEFAULT_UNITARITY_TOLERANCE: f64 = 1e-12;

/// Checks that the state's two-norm is 1 within tolerance.
///
/// # Arguments
/// * `state` - The state to check.
/// * `tolerance` - Allowed deviation from 1; defaults to 1e-13.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QumatError::StateError)` otherwise.
pub fn check_normalization(state: &QubitState, tolerance: Option<f64>) -> Result<(), QumatError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.amplitudes().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq.sqrt() - 1.0).abs() > effective_tolerance {
        Err(QumatError::StateError {
            message: format!(
                "state two-norm {} deviates from 1 beyond tolerance {}",
                norm_sq.sqrt(),
                effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that `M · M†` is the identity within tolerance.
///
/// The operator engine itself never verifies unitarity (it produces a
/// unitary exactly when its input gate is one); this check is for
/// callers that want the guarantee explicitly.
///
/// # Arguments
/// * `matrix` - The matrix to check.
/// * `tolerance` - Allowed per-entry deviation; defaults to 1e-12.
pub fn check_unitary(matrix: &Array2<Complex64>, tolerance: Option<f64>) -> Result<(), QumatError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_UNITARITY_TOLERANCE);
    if is_unitary(matrix, effective_tolerance) {
        Ok(())
    } else {
        Err(QumatError::InvalidMatrixShape {
            message: format!(
                "matrix of order {} is not unitary within tolerance {}",
                matrix.nrows(),
                effective_tolerance
            ),
        })
    }
}

/// Performs the basic state checks. Currently normalization only; the
/// constructor-level invariants cover the rest.
///
/// # Arguments
/// * `state` - The state to validate.
/// * `norm_tolerance` - Optional allowed deviation from unit norm.
pub fn validate_state(state: &QubitState, norm_tolerance: Option<f64>) -> Result<(), QumatError> {
    check_normalization(state, norm_tolerance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::hadamard;

    #[test]
    fn fresh_states_pass_normalization() -> Result<(), QumatError> {
        let state = QubitState::zero(3)?;
        check_normalization(&state, None)?;
        validate_state(&state, None)?;
        Ok(())
    }

    #[test]
    fn unitarity_check_accepts_hadamard_and_rejects_sums() {
        assert!(check_unitary(&hadamard(), None).is_ok());
        let doubled = hadamard() + hadamard();
        assert!(matches!(
            check_unitary(&doubled, None),
            Err(QumatError::InvalidMatrixShape { .. })
        ));
    }
}
