// src/gates/mod.rs

//! Gate prototypes and the process-wide registry.
//!
//! A prototype pairs a gate name with its parameter form and a matrix
//! constructor. The registry maps names (and their aliases) to
//! prototypes; it is initialized once on first access and read-only
//! thereafter. Parameter validation is table-driven from the prototype's
//! parameter form, so every constructor sees parameters of the right
//! shape.

use std::collections::HashMap;
use std::fmt;

use ndarray::{array, Array2};
use num_complex::Complex64;
use once_cell::sync::Lazy;

use crate::core::matrix::{IM, ONE, ZERO};
use crate::core::QumatError;

// --- Standard gate matrices ---

/// The 2×2 identity.
pub fn identity2() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, ONE]]
}

/// Pauli X (bit flip).
pub fn pauli_x() -> Array2<Complex64> {
    array![[ZERO, ONE], [ONE, ZERO]]
}

/// Pauli Y.
pub fn pauli_y() -> Array2<Complex64> {
    array![[ZERO, -IM], [IM, ZERO]]
}

/// Pauli Z (phase flip).
pub fn pauli_z() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, -ONE]]
}

/// Hadamard.
pub fn hadamard() -> Array2<Complex64> {
    let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    array![[s, s], [s, -s]]
}

/// S, the quarter-turn phase gate diag(1, i).
pub fn phase_s() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, IM]]
}

/// S†, the inverse quarter turn diag(1, -i).
pub fn phase_s_dagger() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, -IM]]
}

/// T, the eighth-turn phase gate diag(1, e^(iπ/4)).
pub fn phase_t() -> Array2<Complex64> {
    let e = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2);
    array![[ONE, ZERO], [ZERO, e]]
}

/// T†, diag(1, e^(-iπ/4)).
pub fn phase_t_dagger() -> Array2<Complex64> {
    let e = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2);
    array![[ONE, ZERO], [ZERO, e]]
}

/// √X, the half bit flip.
pub fn sqrt_x() -> Array2<Complex64> {
    let p = Complex64::new(0.5, 0.5);
    let m = Complex64::new(0.5, -0.5);
    array![[p, m], [m, p]]
}

/// √X†, the inverse half flip.
pub fn sqrt_x_dagger() -> Array2<Complex64> {
    let p = Complex64::new(0.5, 0.5);
    let m = Complex64::new(0.5, -0.5);
    array![[m, p], [p, m]]
}

/// Rotation about X by `theta`.
pub fn rotation_x(theta: f64) -> Array2<Complex64> {
    let half = theta / 2.0;
    let cos = Complex64::new(half.cos(), 0.0);
    let msin = -IM * half.sin();
    array![[cos, msin], [msin, cos]]
}

/// Rotation about Y by `theta`.
pub fn rotation_y(theta: f64) -> Array2<Complex64> {
    let half = theta / 2.0;
    let cos = Complex64::new(half.cos(), 0.0);
    let sin = Complex64::new(half.sin(), 0.0);
    array![[cos, -sin], [sin, cos]]
}

/// Rotation about Z by `theta`.
pub fn rotation_z(theta: f64) -> Array2<Complex64> {
    let half = theta / 2.0;
    let lower = Complex64::new(half.cos(), half.sin());
    array![[lower.conj(), ZERO], [ZERO, lower]]
}

/// Phase gate diag(1, e^(iθ)).
pub fn phase(theta: f64) -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, Complex64::new(theta.cos(), theta.sin())]]
}

/// The discrete phase gate diag(1, e^(2πi/2^k)) used by Fourier-style
/// constructions.
pub fn phase_k(k: u32) -> Array2<Complex64> {
    let theta = 2.0 * std::f64::consts::PI / f64::from(1u32 << k.min(31));
    phase(theta)
}

/// The two-qubit SWAP.
pub fn swap_gate() -> Array2<Complex64> {
    array![
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ZERO, ONE, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, ZERO, ONE]
    ]
}

// --- Parameter forms ---

/// Parameters supplied with a gate application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateParams {
    /// The gate takes no parameters.
    NoParam,
    /// One rotation or phase angle in radians.
    OneAngle {
        /// The angle θ.
        theta: f64,
    },
    /// One small non-negative integer, e.g. the k of a 2π/2^k phase.
    OneInt {
        /// The integer parameter.
        k: u32,
    },
}

impl fmt::Display for GateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateParams::NoParam => Ok(()),
            GateParams::OneAngle { theta } => write!(f, "({:.4})", theta),
            GateParams::OneInt { k } => write!(f, "({})", k),
        }
    }
}

/// The parameter form a prototype expects; validation is driven from
/// this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Expects [`GateParams::NoParam`].
    NoParam,
    /// Expects [`GateParams::OneAngle`].
    OneAngle,
    /// Expects [`GateParams::OneInt`].
    OneInt,
}

impl ParamKind {
    fn accepts(self, params: &GateParams) -> bool {
        matches!(
            (self, params),
            (ParamKind::NoParam, GateParams::NoParam)
                | (ParamKind::OneAngle, GateParams::OneAngle { .. })
                | (ParamKind::OneInt, GateParams::OneInt { .. })
        )
    }
}

// --- Prototypes & registry ---

/// An entry of the gate registry: the canonical name, the number of
/// qubits the base matrix spans, the expected parameter form, and the
/// matrix constructor.
#[derive(Clone)]
pub struct GatePrototype {
    /// Canonical gate name (aliases resolve to the same prototype).
    pub name: &'static str,
    /// Qubits spanned by the base matrix.
    pub qubits: usize,
    /// Expected parameter form.
    pub params: ParamKind,
    builder: fn(&GateParams) -> Array2<Complex64>,
}

impl GatePrototype {
    /// Produces the base matrix for the given parameters, rejecting
    /// parameters whose form does not match the prototype.
    pub fn matrix(&self, params: &GateParams) -> Result<Array2<Complex64>, QumatError> {
        if !self.params.accepts(params) {
            return Err(QumatError::ParameterMismatch {
                message: format!(
                    "gate '{}' expects {:?} parameters, got {:?}",
                    self.name, self.params, params
                ),
            });
        }
        Ok((self.builder)(params))
    }
}

impl fmt::Debug for GatePrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatePrototype")
            .field("name", &self.name)
            .field("qubits", &self.qubits)
            .field("params", &self.params)
            .finish()
    }
}

fn angle_of(params: &GateParams) -> f64 {
    match params {
        GateParams::OneAngle { theta } => *theta,
        // Unreachable after form validation; a zero angle keeps the
        // builder total.
        _ => 0.0,
    }
}

fn int_of(params: &GateParams) -> u32 {
    match params {
        GateParams::OneInt { k } => *k,
        _ => 0,
    }
}

static REGISTRY: Lazy<HashMap<&'static str, GatePrototype>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, GatePrototype> = HashMap::new();
    let mut add = |names: &[&'static str], qubits: usize, params: ParamKind, builder: fn(&GateParams) -> Array2<Complex64>| {
        let canonical = names[0];
        for name in names {
            table.insert(name, GatePrototype { name: canonical, qubits, params, builder });
        }
    };

    add(&["id", "i"], 1, ParamKind::NoParam, |_| identity2());
    add(&["x", "not"], 1, ParamKind::NoParam, |_| pauli_x());
    add(&["y"], 1, ParamKind::NoParam, |_| pauli_y());
    add(&["z"], 1, ParamKind::NoParam, |_| pauli_z());
    add(&["h", "hadamard"], 1, ParamKind::NoParam, |_| hadamard());
    add(&["s"], 1, ParamKind::NoParam, |_| phase_s());
    add(&["sdg"], 1, ParamKind::NoParam, |_| phase_s_dagger());
    add(&["t"], 1, ParamKind::NoParam, |_| phase_t());
    add(&["tdg"], 1, ParamKind::NoParam, |_| phase_t_dagger());
    add(&["sx", "sqrt_x"], 1, ParamKind::NoParam, |_| sqrt_x());
    add(&["sxdg"], 1, ParamKind::NoParam, |_| sqrt_x_dagger());
    add(&["rx"], 1, ParamKind::OneAngle, |p| rotation_x(angle_of(p)));
    add(&["ry"], 1, ParamKind::OneAngle, |p| rotation_y(angle_of(p)));
    add(&["rz"], 1, ParamKind::OneAngle, |p| rotation_z(angle_of(p)));
    add(&["p", "phase"], 1, ParamKind::OneAngle, |p| phase(angle_of(p)));
    add(&["pk", "phase_k"], 1, ParamKind::OneInt, |p| phase_k(int_of(p)));
    add(&["swap"], 2, ParamKind::NoParam, |_| swap_gate());

    table
});

/// Looks up a gate prototype by name or alias (case-insensitive).
///
/// # Returns
/// * `Err(QumatError::UnknownGate)` if nothing is registered under the
///   name.
pub fn gate_prototype(name: &str) -> Result<&'static GatePrototype, QumatError> {
    let key = name.to_ascii_lowercase();
    REGISTRY.get(key.as_str()).ok_or_else(|| QumatError::UnknownGate {
        message: format!("no gate prototype is registered under '{}'", name),
    })
}
