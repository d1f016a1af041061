// src/memory/mod.rs

//! Register-structured memory over one joint qubit state.
//!
//! Registers are named, contiguous slices of the joint state, laid out
//! in declaration order. The memory owns the state, translates
//! (register label, register-local index) pairs to global qubit indices
//! before the operator engine is invoked, applies produced operator
//! matrices, and extracts full or per-register probabilities.

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::{QubitState, QumatError};

/// A named contiguous slice of the joint register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    label: String,
    width: usize,
    offset: usize,
}

impl Register {
    /// The register's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of qubits in the register.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Global index of the register's first qubit.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Translates a register-local index to a global qubit index.
    pub fn global_index(&self, local: usize) -> Option<usize> {
        (local < self.width).then_some(self.offset + local)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.label, self.offset, self.offset + self.width - 1)
    }
}

/// The joint state plus its register layout.
pub struct QuantumMemory {
    registers: Vec<Register>,
    state: QubitState,
}

impl QuantumMemory {
    /// Creates a memory from a register layout, initialized to |0…0⟩.
    ///
    /// # Arguments
    /// * `layout` - (label, width) pairs in layout order; labels must be
    ///   unique and widths positive.
    pub fn new(layout: &[(&str, usize)]) -> Result<Self, QumatError> {
        let registers = Self::build_layout(layout)?;
        let noq = registers.iter().map(Register::width).sum();
        let state = QubitState::zero(noq)?;
        Ok(Self { registers, state })
    }

    /// Creates a memory from a layout and an explicit initial state.
    pub fn with_state(layout: &[(&str, usize)], state: QubitState) -> Result<Self, QumatError> {
        let registers = Self::build_layout(layout)?;
        let noq: usize = registers.iter().map(Register::width).sum();
        if state.noq() != noq {
            return Err(QumatError::StateError {
                message: format!(
                    "initial state covers {} qubits but the layout declares {}",
                    state.noq(),
                    noq
                ),
            });
        }
        Ok(Self { registers, state })
    }

    fn build_layout(layout: &[(&str, usize)]) -> Result<Vec<Register>, QumatError> {
        if layout.is_empty() {
            return Err(QumatError::StateError {
                message: "memory layout must declare at least one register".to_string(),
            });
        }
        let mut registers = Vec::with_capacity(layout.len());
        let mut offset = 0usize;
        for (label, width) in layout {
            if *width == 0 {
                return Err(QumatError::StateError {
                    message: format!("register '{}' must span at least one qubit", label),
                });
            }
            if registers.iter().any(|r: &Register| r.label == *label) {
                return Err(QumatError::StateError {
                    message: format!("register label '{}' is declared twice", label),
                });
            }
            registers.push(Register {
                label: label.to_string(),
                width: *width,
                offset,
            });
            offset += width;
        }
        Ok(registers)
    }

    /// Total qubit count of the joint state.
    pub fn noq(&self) -> usize {
        self.state.noq()
    }

    /// The register layout, in declaration order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Looks up a register by label.
    pub fn register(&self, label: &str) -> Result<&Register, QumatError> {
        self.registers
            .iter()
            .find(|r| r.label == label)
            .ok_or_else(|| QumatError::StateError {
                message: format!("no register is declared under '{}'", label),
            })
    }

    /// Translates a (label, local index) pair to a global qubit index.
    pub fn global_index(&self, label: &str, local: usize) -> Result<usize, QumatError> {
        let register = self.register(label)?;
        register.global_index(local).ok_or_else(|| QumatError::IndexOutOfRange {
            message: format!(
                "local index {} lies outside register '{}' of width {}",
                local, label, register.width
            ),
        })
    }

    /// Read-only access to the joint state.
    pub fn state(&self) -> &QubitState {
        &self.state
    }

    /// Replaces the joint state, keeping the layout.
    pub fn set_state(&mut self, state: QubitState) -> Result<(), QumatError> {
        if state.noq() != self.noq() {
            return Err(QumatError::StateError {
                message: format!(
                    "replacement state covers {} qubits but the memory holds {}",
                    state.noq(),
                    self.noq()
                ),
            });
        }
        self.state = state;
        Ok(())
    }

    /// Mutable state access for the simulation layer. (Internal.)
    pub(crate) fn state_mut(&mut self) -> &mut QubitState {
        &mut self.state
    }

    /// Applies a full-width operator matrix to the joint state.
    pub fn apply(&mut self, operator: &Array2<Complex64>) -> Result<(), QumatError> {
        self.state.apply_matrix(operator)
    }

    /// Probabilities over every joint basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.state.probabilities()
    }

    /// Marginal probabilities over one register's 2^width local outcomes,
    /// summing out every other qubit.
    pub fn register_probabilities(&self, label: &str) -> Result<Vec<f64>, QumatError> {
        let register = self.register(label)?;
        let noq = self.noq();
        let mut marginal = vec![0.0f64; 1usize << register.width];
        for (index, probability) in self.state.probabilities().into_iter().enumerate() {
            let mut local = 0usize;
            for bit in 0..register.width {
                let position = noq - 1 - (register.offset + bit);
                local = (local << 1) | ((index >> position) & 1);
            }
            marginal[local] += probability;
        }
        Ok(marginal)
    }
}

impl fmt::Display for QuantumMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory[{} qubits;", self.noq())?;
        for (pos, register) in self.registers.iter().enumerate() {
            write!(f, "{} {}", if pos > 0 { "," } else { "" }, register)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use num_complex::Complex64;

    #[test]
    fn layout_assigns_contiguous_offsets() -> Result<(), QumatError> {
        let memory = QuantumMemory::new(&[("ctrl", 2), ("data", 3)])?;
        assert_eq!(memory.noq(), 5);
        assert_eq!(memory.global_index("ctrl", 0)?, 0);
        assert_eq!(memory.global_index("ctrl", 1)?, 1);
        assert_eq!(memory.global_index("data", 0)?, 2);
        assert_eq!(memory.global_index("data", 2)?, 4);
        Ok(())
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        match QuantumMemory::new(&[("a", 1), ("a", 2)]) {
            Err(QumatError::StateError { message }) => assert!(message.contains("'a'")),
            other => panic!("expected state error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn out_of_register_local_index_is_rejected() {
        let memory = QuantumMemory::new(&[("a", 2)]).unwrap();
        assert!(matches!(
            memory.global_index("a", 2),
            Err(QumatError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            memory.global_index("b", 0),
            Err(QumatError::StateError { .. })
        ));
    }

    #[test]
    fn register_marginal_sums_out_other_qubits() -> Result<(), QumatError> {
        // Joint state (|00⟩ + |11⟩)/√2 over registers a, b of one qubit
        // each: each register alone is an even coin.
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let state = QubitState::new(Array1::from_vec(vec![s, zero, zero, s]))?;
        let memory = QuantumMemory::with_state(&[("a", 1), ("b", 1)], state)?;

        for label in ["a", "b"] {
            let marginal = memory.register_probabilities(label)?;
            assert!((marginal[0] - 0.5).abs() < 1e-12, "register {}", label);
            assert!((marginal[1] - 0.5).abs() < 1e-12, "register {}", label);
        }
        Ok(())
    }

    #[test]
    fn mismatched_initial_state_is_rejected() {
        let state = QubitState::zero(2).unwrap();
        assert!(matches!(
            QuantumMemory::with_state(&[("a", 3)], state),
            Err(QumatError::StateError { .. })
        ));
    }
}
