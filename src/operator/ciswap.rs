// src/operator/ciswap.rs

//! Control-index relocation for target tuples with in-window controls.
//!
//! The projector-decomposition kernel requires a control-free target
//! window. When a control qubit lies strictly between the lowest and
//! highest target of a tuple, the driver relocates it: each intruding
//! control is exchanged with the current lowest target, the kernel runs
//! on the swapped problem, and the result is conjugated with the SWAP
//! operators so the full operator acts on the original wiring.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;
use crate::core::matrix::identity;
use crate::gates::pauli_x;
use crate::operator::kernel::kernel;
use crate::operator::{validate, Control};

/// Ordered pairwise swaps. Applied left-to-right before the gate and
/// right-to-left after it.
pub type SwapPlan = Vec<(usize, usize)>;

/// Builds the full-width CNOT with `control` (polarity '1') and `target`,
/// expressed through the kernel with a one-bit target range.
pub fn cnot_matrix(
    noq: usize,
    control: usize,
    target: usize,
) -> Result<Array2<Complex64>, QumatError> {
    kernel(noq, &[Control::one(control)], (target, target), &pauli_x())
}

/// Builds the full-width SWAP of qubits `a` and `b` as the three-CNOT
/// product `CNOT(a,b) · CNOT(b,a) · CNOT(a,b)`.
pub fn swap_matrix(noq: usize, a: usize, b: usize) -> Result<Array2<Complex64>, QumatError> {
    if a == b {
        return Err(QumatError::RangeInvalid {
            message: format!("swap endpoints coincide at qubit {}", a),
        });
    }
    let forward = cnot_matrix(noq, a, b)?;
    let backward = cnot_matrix(noq, b, a)?;
    Ok(forward.dot(&backward).dot(&forward))
}

/// Greedy relocation plan for controls intruding on a target window.
///
/// Walks the controls in ascending index order against a mutable copy of
/// the targets. A control inside the current window is exchanged with the
/// current lowest target: the pair joins the plan, every occurrence of
/// that target value is renamed to the control's position, and the
/// control itself is recorded at the vacated lowest position. The lowest
/// target index rises monotonically, so each later control is judged
/// against the shrunken window; the membership test is inclusive at the
/// current lower bound.
///
/// Returns the plan, the relocated control list, and the bounding window
/// of the final target positions.
pub(crate) fn plan_relocation(
    controls: &[Control],
    targets: &[usize],
) -> Result<(SwapPlan, Vec<Control>, (usize, usize)), QumatError> {
    let mut working: Vec<usize> = targets.to_vec();
    let mut sorted: Vec<Control> = controls.to_vec();
    sorted.sort_by_key(|c| c.index);

    let mut plan: SwapPlan = Vec::new();
    let mut relocated: Vec<Control> = Vec::with_capacity(sorted.len());
    for control in sorted {
        let lowest = bound(&working, Bound::Lower)?;
        let highest = bound(&working, Bound::Upper)?;
        if control.index >= lowest && control.index < highest {
            plan.push((lowest, control.index));
            for target in working.iter_mut() {
                if *target == lowest {
                    *target = control.index;
                }
            }
            relocated.push(Control::new(lowest, control.polarity));
        } else {
            relocated.push(control);
        }
    }

    let window = (bound(&working, Bound::Lower)?, bound(&working, Bound::Upper)?);
    Ok((plan, relocated, window))
}

enum Bound {
    Lower,
    Upper,
}

fn bound(targets: &[usize], which: Bound) -> Result<usize, QumatError> {
    let found = match which {
        Bound::Lower => targets.iter().min(),
        Bound::Upper => targets.iter().max(),
    };
    found.copied().ok_or_else(|| QumatError::Internal {
        message: "relocation planning lost every target position".to_string(),
    })
}

/// Builds the full-width operator for `u` on a target *tuple*, relocating
/// any control that sits inside the tuple's window.
///
/// With no intruding control the tuple's bounding range goes straight to
/// the kernel; the caller-supplied `u` must already be arranged for that
/// contiguous window, and a `u` spanning fewer qubits than the window
/// surfaces the kernel's dimension mismatch. With intruders, the operator
/// is `post · K · pre` where K is the kernel output on the swapped
/// problem and pre/post are the SWAP products of the plan in forward and
/// reverse order.
///
/// # Returns
/// * `Err(QumatError::EmptyTargetTuple)` for an empty tuple.
/// * `Err(QumatError::ControlsOverlapTargets)` if a control is a target.
/// * Any failure raised by the kernel on the (possibly swapped) problem.
pub fn ctrl_tuple(
    noq: usize,
    controls: &[Control],
    targets: &[usize],
    u: &Array2<Complex64>,
) -> Result<Array2<Complex64>, QumatError> {
    validate::check_noq(noq)?;
    validate::check_gate_matrix(u)?;
    validate::check_target_tuple(noq, targets)?;
    validate::check_control_list(noq, controls)?;
    validate::check_controls_disjoint_from_tuple(controls, targets)?;

    let tuple_dim = 1usize
        .checked_shl(targets.len() as u32)
        .ok_or_else(|| QumatError::InvalidNoq {
            message: format!("target tuple of {} qubits overflows the gate dimension", targets.len()),
        })?;
    if u.nrows() != tuple_dim {
        return Err(QumatError::DimensionMismatch {
            message: format!(
                "gate matrix order {} does not match the {}-qubit target tuple",
                u.nrows(),
                targets.len()
            ),
        });
    }

    let lo = bound(targets, Bound::Lower)?;
    let hi = bound(targets, Bound::Upper)?;
    let needs_relocation = controls.iter().any(|c| c.index > lo && c.index < hi);
    if !needs_relocation {
        return kernel(noq, controls, (lo, hi), u);
    }

    let (plan, relocated, window) = plan_relocation(controls, targets)?;
    log::debug!(
        target: "qumat::operator",
        "ctrl_tuple: relocating {} in-window control(s), plan {:?}, window [{},{}]",
        plan.len(), plan, window.0, window.1
    );
    let core = kernel(noq, &relocated, window, u)?;

    let mut swaps: Vec<Array2<Complex64>> = Vec::with_capacity(plan.len());
    for (a, b) in &plan {
        swaps.push(swap_matrix(noq, *a, *b)?);
    }
    let dim = 1usize << noq;
    // First-listed swap acts on the state first, so it sits rightmost in
    // the pre-product; the post-product reverses the plan.
    let mut pre = identity(dim);
    for swap in &swaps {
        pre = swap.dot(&pre);
    }
    let mut post = identity(dim);
    for swap in swaps.iter().rev() {
        post = swap.dot(&post);
    }
    Ok(post.dot(&core).dot(&pre))
}
