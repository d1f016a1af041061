// src/operator/enlarge.rs

//! Tensor-product enlargement of a local operator to the full register.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;
use crate::core::matrix::{tensor_chain, TensorFactor};
use crate::operator::validate;

/// Embeds a single-qubit operator at position `index` of an `noq`-qubit
/// register: `I_{2^index} ⊗ U ⊗ I_{2^(noq-1-index)}`.
///
/// The three placements (first qubit, last qubit, interior) are handled
/// as explicit cases so no order-one identity ever enters a product.
///
/// # Arguments
/// * `noq` - Total qubit count of the joint state, ≥ 1.
/// * `index` - Target qubit, in [0, noq).
/// * `u` - A 2×2 gate matrix.
///
/// # Returns
/// * `Ok(matrix)` of order 2^noq.
/// * `Err(QumatError::DimensionMismatch)` if `u` is not 2×2.
/// * `Err(QumatError::IndexOutOfRange)` if `index` is outside the register.
pub fn enlarge_one(
    noq: usize,
    index: usize,
    u: &Array2<Complex64>,
) -> Result<Array2<Complex64>, QumatError> {
    validate::check_noq(noq)?;
    validate::check_gate_matrix(u)?;
    if u.nrows() != 2 {
        return Err(QumatError::DimensionMismatch {
            message: format!(
                "single-qubit enlargement expects a 2x2 gate matrix, got order {}",
                u.nrows()
            ),
        });
    }
    validate::check_target_index(noq, index)?;

    if noq == 1 {
        return Ok(u.clone());
    }
    let chain = if index == 0 {
        vec![
            TensorFactor::Dense(u.clone()),
            TensorFactor::Ident(1usize << (noq - 1)),
        ]
    } else if index == noq - 1 {
        vec![
            TensorFactor::Ident(1usize << (noq - 1)),
            TensorFactor::Dense(u.clone()),
        ]
    } else {
        vec![
            TensorFactor::Ident(1usize << index),
            TensorFactor::Dense(u.clone()),
            TensorFactor::Ident(1usize << (noq - 1 - index)),
        ]
    };
    tensor_chain(chain)
}

/// Embeds an operator spanning the contiguous window `[lo, hi]` of an
/// `noq`-qubit register: `I_{2^lo} ⊗ U ⊗ I_{2^(noq-1-hi)}`.
///
/// Degenerates to [`enlarge_one`] when the window is a single qubit, and
/// to `U` itself when the window spans the whole register.
///
/// # Returns
/// * `Err(QumatError::RangeInvalid)` if `lo > hi` or `hi` is outside the
///   register.
/// * `Err(QumatError::DimensionMismatch)` if the order of `u` is not
///   2^(hi-lo+1).
pub fn enlarge_range(
    noq: usize,
    window: (usize, usize),
    u: &Array2<Complex64>,
) -> Result<Array2<Complex64>, QumatError> {
    let (lo, hi) = window;
    validate::check_noq(noq)?;
    validate::check_gate_matrix(u)?;
    validate::check_target_range(noq, lo, hi)?;
    validate::check_window_dimension(lo, hi, u)?;

    if lo == hi && u.nrows() == 2 {
        return enlarge_one(noq, lo, u);
    }
    if lo == 0 && hi == noq - 1 {
        return Ok(u.clone());
    }

    let mut chain = Vec::with_capacity(3);
    if lo > 0 {
        chain.push(TensorFactor::Ident(1usize << lo));
    }
    chain.push(TensorFactor::Dense(u.clone()));
    if hi < noq - 1 {
        chain.push(TensorFactor::Ident(1usize << (noq - 1 - hi)));
    }
    tensor_chain(chain)
}
