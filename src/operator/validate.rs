// src/operator/validate.rs

//! Input validators for operator construction.
//!
//! Every entry point runs these before allocating any full-width matrix,
//! and each validator reports the first offending constraint it finds.
//! The check order within an entry point is: qubit count, matrix shape,
//! target range, then polarity, duplicate controls, control index
//! domain, controls-cover-all and overlap with the target window, and
//! finally the window dimension.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;
use crate::operator::Control;

/// Checks that the joint qubit count is positive and addressable.
pub(crate) fn check_noq(noq: usize) -> Result<(), QumatError> {
    if noq == 0 {
        return Err(QumatError::InvalidNoq {
            message: "operator construction requires at least one qubit".to_string(),
        });
    }
    if noq >= usize::BITS as usize {
        return Err(QumatError::InvalidNoq {
            message: format!("qubit count {} overflows the state dimension", noq),
        });
    }
    Ok(())
}

/// Checks that a gate matrix is square with a power-of-two order of at
/// least 2, returning the number of qubits it spans.
pub(crate) fn check_gate_matrix(u: &Array2<Complex64>) -> Result<usize, QumatError> {
    let (rows, cols) = u.dim();
    if rows != cols {
        return Err(QumatError::InvalidMatrixShape {
            message: format!("gate matrix of shape {}x{} is not square", rows, cols),
        });
    }
    if rows < 2 || !rows.is_power_of_two() {
        return Err(QumatError::InvalidMatrixShape {
            message: format!("gate matrix order {} is not a power of two covering at least one qubit", rows),
        });
    }
    Ok(rows.trailing_zeros() as usize)
}

/// Checks a single target index against the register width.
pub(crate) fn check_target_index(noq: usize, index: usize) -> Result<(), QumatError> {
    if index >= noq {
        return Err(QumatError::IndexOutOfRange {
            message: format!("target index {} lies outside the register of {} qubits", index, noq),
        });
    }
    Ok(())
}

/// Checks that a target range is ordered and inside the register.
pub(crate) fn check_target_range(noq: usize, lo: usize, hi: usize) -> Result<(), QumatError> {
    if lo > hi {
        return Err(QumatError::RangeInvalid {
            message: format!("target range has lo {} greater than hi {}", lo, hi),
        });
    }
    if hi >= noq {
        return Err(QumatError::RangeInvalid {
            message: format!("target range upper bound {} lies outside the register of {} qubits", hi, noq),
        });
    }
    Ok(())
}

/// Checks that the gate matrix order equals the target window dimension.
pub(crate) fn check_window_dimension(
    lo: usize,
    hi: usize,
    u: &Array2<Complex64>,
) -> Result<(), QumatError> {
    let window_dim = 1usize << (hi - lo + 1);
    if u.nrows() != window_dim {
        return Err(QumatError::DimensionMismatch {
            message: format!(
                "gate matrix order {} does not match the [{}..{}] window dimension {}",
                u.nrows(),
                lo,
                hi,
                window_dim
            ),
        });
    }
    Ok(())
}

/// Validates a control list in isolation: polarity, duplicate indices,
/// index domain, in that order.
pub(crate) fn check_control_list(noq: usize, controls: &[Control]) -> Result<(), QumatError> {
    for control in controls {
        if control.polarity != '0' && control.polarity != '1' {
            return Err(QumatError::PolarityInvalid {
                message: format!(
                    "control on qubit {} has polarity '{}', expected '0' or '1'",
                    control.index, control.polarity
                ),
            });
        }
    }
    for (pos, control) in controls.iter().enumerate() {
        if controls[..pos].iter().any(|c| c.index == control.index) {
            return Err(QumatError::ControlsDuplicate {
                message: format!("control index {} appears more than once", control.index),
            });
        }
    }
    for control in controls {
        if control.index >= noq {
            return Err(QumatError::IndexOutOfRange {
                message: format!(
                    "control index {} lies outside the register of {} qubits",
                    control.index, noq
                ),
            });
        }
    }
    Ok(())
}

/// Validates a control list against the register and a target window.
///
/// Runs, in order: polarity, duplicate indices, index domain,
/// controls-cover-all (a window spanning the whole register leaves no
/// position for controls), and overlap with the window.
pub(crate) fn check_controls(
    noq: usize,
    controls: &[Control],
    lo: usize,
    hi: usize,
) -> Result<(), QumatError> {
    check_control_list(noq, controls)?;
    if !controls.is_empty() && hi - lo + 1 == noq {
        return Err(QumatError::ControlsCoverAll {
            message: format!(
                "target window [{}..{}] spans all {} qubits, leaving no position for controls",
                lo, hi, noq
            ),
        });
    }
    for control in controls {
        if control.index >= lo && control.index <= hi {
            return Err(QumatError::ControlsOverlapTargets {
                message: format!(
                    "control index {} lies inside the target window [{}..{}]",
                    control.index, lo, hi
                ),
            });
        }
    }
    Ok(())
}

/// Validates a target tuple: non-empty, distinct, inside the register.
pub(crate) fn check_target_tuple(noq: usize, targets: &[usize]) -> Result<(), QumatError> {
    if targets.is_empty() {
        return Err(QumatError::EmptyTargetTuple {
            message: "target tuple must name at least one qubit".to_string(),
        });
    }
    for (pos, target) in targets.iter().enumerate() {
        if targets[..pos].contains(target) {
            return Err(QumatError::RangeInvalid {
                message: format!("target tuple repeats index {}", target),
            });
        }
    }
    for target in targets {
        check_target_index(noq, *target)?;
    }
    Ok(())
}

/// Checks that controls and a target tuple are disjoint.
pub(crate) fn check_controls_disjoint_from_tuple(
    controls: &[Control],
    targets: &[usize],
) -> Result<(), QumatError> {
    for control in controls {
        if targets.contains(&control.index) {
            return Err(QumatError::ControlsOverlapTargets {
                message: format!("control index {} is also a target", control.index),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::{identity, ONE, ZERO};
    use ndarray::array;

    #[test]
    fn polarity_is_checked_before_duplicates() {
        // Both constraints are violated; polarity must win.
        let controls = [Control::new(1, 'x'), Control::new(1, '1')];
        match check_controls(4, &controls, 2, 3) {
            Err(QumatError::PolarityInvalid { .. }) => {}
            other => panic!("expected polarity error, got {:?}", other),
        }
    }

    #[test]
    fn cover_all_is_reported_before_overlap() {
        // A full-width window makes every control an overlap as well; the
        // cover-all diagnosis is the useful one.
        let controls = [Control::one(0)];
        match check_controls(3, &controls, 0, 2) {
            Err(QumatError::ControlsCoverAll { .. }) => {}
            other => panic!("expected cover-all error, got {:?}", other),
        }
    }

    #[test]
    fn non_square_and_non_power_matrices_are_rejected() {
        let non_square = Array2::from_elem((2, 3), ZERO);
        assert!(matches!(
            check_gate_matrix(&non_square),
            Err(QumatError::InvalidMatrixShape { .. })
        ));
        let odd = array![[ONE, ZERO, ZERO], [ZERO, ONE, ZERO], [ZERO, ZERO, ONE]];
        assert!(matches!(
            check_gate_matrix(&odd),
            Err(QumatError::InvalidMatrixShape { .. })
        ));
        assert_eq!(check_gate_matrix(&identity(8)).unwrap(), 3);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(matches!(
            check_target_range(4, 3, 1),
            Err(QumatError::RangeInvalid { .. })
        ));
    }

    #[test]
    fn tuple_duplicates_are_rejected() {
        assert!(matches!(
            check_target_tuple(4, &[0, 2, 0]),
            Err(QumatError::RangeInvalid { .. })
        ));
    }
}
