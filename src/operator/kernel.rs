// src/operator/kernel.rs

//! Multi-controlled operator construction by projector decomposition.
//!
//! A gate U on the window `[lo, hi]` controlled by m qubits expands into
//! a sum of 2^m tensor chains, one per control bitstring. In each chain
//! every control position carries the projector selected by its bit,
//! every untouched position carries I₂, and the window carries U for the
//! single bitstring equal to the required control state (identity of the
//! window dimension otherwise). Summing the chains yields the full
//! operator.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;
use crate::core::matrix::{
    projector_one, projector_zero, tensor_chain, TensorFactor, ZERO,
};
use crate::operator::{validate, Control};

/// Builds the full-width operator for `u` on the window `[lo, hi]` of an
/// `noq`-qubit register, conditioned on `controls`.
///
/// Controls are sorted by ascending index before the decision string is
/// formed, regardless of input order; the polarity at bit rank r of that
/// string belongs to the r-th lowest control index. With no controls the
/// sum has a single term and the result is pure enlargement.
///
/// # Returns
/// * `Ok(matrix)` of order 2^noq.
/// * `Err(_)` with the first offending constraint: invalid polarity,
///   duplicate control, controls-cover-all, control inside the window,
///   bad range, or a gate order that does not match the window.
pub fn kernel(
    noq: usize,
    controls: &[Control],
    window: (usize, usize),
    u: &Array2<Complex64>,
) -> Result<Array2<Complex64>, QumatError> {
    let (lo, hi) = window;
    validate::check_noq(noq)?;
    validate::check_gate_matrix(u)?;
    validate::check_target_range(noq, lo, hi)?;
    validate::check_controls(noq, controls, lo, hi)?;
    validate::check_window_dimension(lo, hi, u)?;

    let mut sorted: Vec<Control> = controls.to_vec();
    sorted.sort_by_key(|c| c.index);
    // Decision string: polarities concatenated in ascending-index order.
    let decision: Vec<u8> = sorted
        .iter()
        .map(|c| if c.polarity == '1' { 1 } else { 0 })
        .collect();

    let dim = 1usize << noq;
    let pattern_count = 1usize << sorted.len();
    log::debug!(
        target: "qumat::operator",
        "kernel: noq={} window=[{},{}] controls={} summands={}",
        noq, lo, hi, sorted.len(), pattern_count
    );

    // One accumulator plus the current summand are the only full-width
    // buffers alive at any point.
    let mut accumulator = Array2::from_elem((dim, dim), ZERO);
    for pattern in 0..pattern_count {
        let summand = projector_chain(noq, &sorted, &decision, window, u, pattern)?;
        accumulator += &summand;
    }
    Ok(accumulator)
}

/// Builds the single tensor-chain summand for one control bitstring.
///
/// `pattern` enumerates the bitstrings; bit rank r (the r-th lowest
/// control index) is read from the most significant end, so the padded
/// binary representation of `pattern` is compared against the decision
/// string positionally.
pub(crate) fn projector_chain(
    noq: usize,
    sorted_controls: &[Control],
    decision: &[u8],
    window: (usize, usize),
    u: &Array2<Complex64>,
    pattern: usize,
) -> Result<Array2<Complex64>, QumatError> {
    let (lo, hi) = window;
    let m = sorted_controls.len();
    let bits: Vec<u8> = (0..m).map(|r| ((pattern >> (m - 1 - r)) & 1) as u8).collect();
    let gate_fires = bits == decision;
    let window_dim = 1usize << (hi - lo + 1);

    let mut factors: Vec<TensorFactor> = Vec::with_capacity(noq - (hi - lo + 1) + 1);
    let mut position = 0usize;
    while position < noq {
        if position == lo {
            factors.push(if gate_fires {
                TensorFactor::Dense(u.clone())
            } else {
                TensorFactor::Ident(window_dim)
            });
            position = hi + 1;
            continue;
        }
        match sorted_controls.iter().position(|c| c.index == position) {
            Some(rank) => {
                factors.push(TensorFactor::Dense(if bits[rank] == 1 {
                    projector_one()
                } else {
                    projector_zero()
                }));
            }
            None => factors.push(TensorFactor::Ident(2)),
        }
        position += 1;
    }
    tensor_chain(factors)
}
