// src/core/matrix.rs

//! Dense complex matrix primitives: identities, projectors, Kronecker
//! products, Hermitian conjugation and tensor-chain folding.
//!
//! Operator construction never works with anything sparser than a dense
//! `Array2<Complex64>`; what it does exploit is the *identity-of-order-m*
//! marker ([`TensorFactor::Ident`]), which lets a tensor chain coalesce
//! runs of identity factors before any dense Kronecker work happens.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::QumatError;

/// Complex zero.
pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);
/// Complex one.
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);
/// The imaginary unit i.
pub const IM: Complex64 = Complex64::new(0.0, 1.0);

/// Identity matrix of the given order.
pub fn identity(dim: usize) -> Array2<Complex64> {
    Array2::eye(dim)
}

/// The rank-1 projector |0⟩⟨0| selecting a control qubit's `0` component.
pub fn projector_zero() -> Array2<Complex64> {
    ndarray::array![[ONE, ZERO], [ZERO, ZERO]]
}

/// The rank-1 projector |1⟩⟨1| selecting a control qubit's `1` component.
pub fn projector_one() -> Array2<Complex64> {
    ndarray::array![[ZERO, ZERO], [ZERO, ONE]]
}

/// Hermitian conjugate (conjugate transpose) of a matrix.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Kronecker (tensor) product of two matrices.
///
/// For A of shape (p, q) and B of shape (r, s) the result has shape
/// (p·r, q·s) with entries `A[i,j] · B[k,l]` at row `i·r + k`,
/// column `j·s + l`. The left factor is the high-order one, matching the
/// qubit-0-is-most-significant index convention used throughout.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::from_elem((ar * br, ac * bc), ZERO);
    for i in 0..ar {
        for j in 0..ac {
            let a_ij = a[[i, j]];
            for k in 0..br {
                for l in 0..bc {
                    out[[i * br + k, j * bc + l]] = a_ij * b[[k, l]];
                }
            }
        }
    }
    out
}

/// One link of a tensor chain: either an identity of known order (kept
/// symbolic so chains can skip dense work) or a dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorFactor {
    /// Identity of the given order. Order must be ≥ 1.
    Ident(usize),
    /// An arbitrary dense square matrix.
    Dense(Array2<Complex64>),
}

impl TensorFactor {
    /// Order of this factor.
    pub fn dim(&self) -> usize {
        match self {
            TensorFactor::Ident(d) => *d,
            TensorFactor::Dense(m) => m.nrows(),
        }
    }
}

/// Folds a tensor chain left-to-right into a single dense matrix.
///
/// Adjacent identity factors are merged symbolically before any Kronecker
/// product is formed, and identity-against-dense products use block
/// embedding/scatter loops instead of the general product. A chain that is
/// a single dense factor is returned unchanged, and a chain of identities
/// collapses straight to `identity(d)`.
///
/// # Arguments
/// * `factors` - The chain, leftmost (highest-order qubit) first.
///
/// # Returns
/// * `Ok(matrix)` of order equal to the product of the factor orders.
/// * `Err(QumatError::Internal)` if the chain is empty; callers build
///   chains from validated inputs and never produce one.
pub fn tensor_chain(factors: Vec<TensorFactor>) -> Result<Array2<Complex64>, QumatError> {
    if factors.is_empty() {
        return Err(QumatError::Internal {
            message: "tensor chain folding received an empty factor list".to_string(),
        });
    }

    // Merge identity runs first so the fold below sees at most one
    // identity between dense factors.
    let mut coalesced: Vec<TensorFactor> = Vec::with_capacity(factors.len());
    for factor in factors {
        match (coalesced.last_mut(), factor) {
            (Some(TensorFactor::Ident(d)), TensorFactor::Ident(e)) => *d *= e,
            (_, f) => coalesced.push(f),
        }
    }

    let mut iter = coalesced.into_iter();
    let mut acc = match iter.next() {
        Some(f) => f,
        None => {
            return Err(QumatError::Internal {
                message: "tensor chain coalescing emptied the factor list".to_string(),
            });
        }
    };
    for factor in iter {
        acc = kron_factor(acc, &factor);
    }

    Ok(match acc {
        TensorFactor::Ident(d) => identity(d),
        TensorFactor::Dense(m) => m,
    })
}

/// Kronecker product of an accumulated factor with the next chain link,
/// short-circuiting the identity cases.
fn kron_factor(acc: TensorFactor, next: &TensorFactor) -> TensorFactor {
    match (acc, next) {
        (TensorFactor::Ident(a), TensorFactor::Ident(b)) => TensorFactor::Ident(a * b),
        (TensorFactor::Ident(blocks), TensorFactor::Dense(b)) => {
            // I_m ⊗ B: m copies of B along the block diagonal.
            let d = b.nrows();
            let mut out = Array2::from_elem((blocks * d, blocks * d), ZERO);
            for blk in 0..blocks {
                for i in 0..d {
                    for j in 0..d {
                        out[[blk * d + i, blk * d + j]] = b[[i, j]];
                    }
                }
            }
            TensorFactor::Dense(out)
        }
        (TensorFactor::Dense(a), TensorFactor::Ident(m)) => {
            // A ⊗ I_m: each entry of A scattered along an m-stride diagonal.
            let d = a.nrows();
            let mut out = Array2::from_elem((d * m, d * m), ZERO);
            for i in 0..d {
                for j in 0..d {
                    let a_ij = a[[i, j]];
                    for k in 0..*m {
                        out[[i * m + k, j * m + k]] = a_ij;
                    }
                }
            }
            TensorFactor::Dense(out)
        }
        (TensorFactor::Dense(a), TensorFactor::Dense(b)) => TensorFactor::Dense(kron(&a, b)),
    }
}

/// Tests whether `M · M†` is the identity to within `tolerance` per entry.
pub fn is_unitary(m: &Array2<Complex64>, tolerance: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let product = m.dot(&dagger(m));
    let eye = identity(m.nrows());
    matrices_approx_equal(&product, &eye, tolerance)
}

/// Elementwise approximate equality of two matrices.
pub fn matrices_approx_equal(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
    tolerance: f64,
) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tolerance)
}
