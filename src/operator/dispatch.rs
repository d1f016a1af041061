// src/operator/dispatch.rs

//! Entry-point selection for operator construction requests.
//!
//! A request names its targets in exactly one of three forms; together
//! with the presence or absence of controls that picks the construction
//! path. Single-control requests are ordinary one-element control lists,
//! not a separate code path.

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;
use crate::operator::ciswap::ctrl_tuple;
use crate::operator::enlarge::{enlarge_one, enlarge_range};
use crate::operator::kernel::kernel;
use crate::operator::Control;

/// The three semantic forms a request may use to name its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetForm {
    /// One qubit by index.
    Index(usize),
    /// A contiguous window `(lo, hi)`, both ends inclusive.
    Range(usize, usize),
    /// Distinct indices whose window is their min..max span.
    Tuple(Vec<usize>),
}

impl fmt::Display for TargetForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetForm::Index(i) => write!(f, "q{}", i),
            TargetForm::Range(lo, hi) => write!(f, "q{}..q{}", lo, hi),
            TargetForm::Tuple(indices) => {
                write!(f, "(")?;
                for (pos, index) in indices.iter().enumerate() {
                    write!(f, "{}q{}", if pos > 0 { "," } else { "" }, index)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A complete operator-construction request: the joint qubit count, the
/// target form, the control list (possibly empty) and the local gate
/// matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorRequest {
    /// Total qubit count of the joint state.
    pub noq: usize,
    /// Where the gate acts.
    pub target: TargetForm,
    /// Controls conditioning the gate; empty for an uncontrolled gate.
    pub controls: Vec<Control>,
    /// The local gate matrix of order 2^k.
    pub matrix: Array2<Complex64>,
}

impl OperatorRequest {
    /// An uncontrolled request.
    pub fn new(noq: usize, target: TargetForm, matrix: Array2<Complex64>) -> Self {
        Self { noq, target, controls: Vec::new(), matrix }
    }

    /// A controlled request.
    pub fn controlled(
        noq: usize,
        target: TargetForm,
        controls: Vec<Control>,
        matrix: Array2<Complex64>,
    ) -> Self {
        Self { noq, target, controls, matrix }
    }
}

/// Produces the full-width operator for a request.
///
/// Dispatch: without controls an index or range goes to the enlargement
/// paths; with controls an index collapses to the one-qubit range and
/// joins ranges on the kernel path; tuples always go through the tuple
/// driver, which falls back to the kernel when no control intrudes on
/// the window.
pub fn build_operator(request: &OperatorRequest) -> Result<Array2<Complex64>, QumatError> {
    log::trace!(
        target: "qumat::operator",
        "build_operator: noq={} target={} controls={}",
        request.noq,
        request.target,
        request.controls.len()
    );
    if request.controls.is_empty() {
        return match &request.target {
            TargetForm::Index(i) => enlarge_one(request.noq, *i, &request.matrix),
            TargetForm::Range(lo, hi) => enlarge_range(request.noq, (*lo, *hi), &request.matrix),
            TargetForm::Tuple(indices) => {
                ctrl_tuple(request.noq, &[], indices, &request.matrix)
            }
        };
    }
    match &request.target {
        TargetForm::Index(i) => kernel(request.noq, &request.controls, (*i, *i), &request.matrix),
        TargetForm::Range(lo, hi) => {
            kernel(request.noq, &request.controls, (*lo, *hi), &request.matrix)
        }
        TargetForm::Tuple(indices) => {
            ctrl_tuple(request.noq, &request.controls, indices, &request.matrix)
        }
    }
}
