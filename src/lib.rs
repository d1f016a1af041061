// src/lib.rs

//! `qumat` - A gate-based quantum-circuit simulation library
//!
//! The center of the crate is full-width operator-matrix construction:
//! embedding local gate matrices into the joint space of an n-qubit
//! register, expanding multi-controlled gates by projector decomposition
//! over every control bitpattern, and relocating control qubits that sit
//! inside a target tuple's window. Around that core sit the gate
//! registry, the flow (circuit) layer, the register-structured memory
//! and a simulator with deterministic measurement sampling.

pub mod core;
pub mod operator;
pub mod gates;
pub mod flows;
pub mod memory;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{QubitState, QumatError};
pub use operator::{
    build_operator, ctrl_tuple, enlarge_one, enlarge_range, kernel, Control, OperatorRequest,
    TargetForm,
};
pub use gates::{gate_prototype, GateParams, GatePrototype};
pub use flows::{Flow, FlowBuilder, FlowError, FlowOp};
pub use memory::{QuantumMemory, Register};
pub use simulation::{RunResult, Simulator};
pub use validation::{check_normalization, check_unitary, validate_state};

// Example 1: Building and applying a Toffoli operator
// Demonstrates the multi-controlled kernel producing the full 8x8
// operator and the resulting action on a basis state.
/// ```
/// use qumat::{kernel, Control, QubitState, QumatError};
/// use qumat::gates::pauli_x;
///
/// // Toffoli on 3 qubits: X on qubit 2, fired when qubits 0 and 1 are |1⟩.
/// let toffoli = kernel(3, &[Control::one(0), Control::one(1)], (2, 2), &pauli_x())?;
///
/// // |110⟩ satisfies both controls, so the target flips: |111⟩.
/// let input = QubitState::from_bitstring("110")?;
/// let output = toffoli.dot(input.amplitudes());
/// assert!((output[7].norm() - 1.0).abs() < 1e-12);
///
/// // |010⟩ leaves the first control unsatisfied and passes through.
/// let idle = QubitState::from_bitstring("010")?;
/// let unchanged = toffoli.dot(idle.amplitudes());
/// assert!((unchanged[2].norm() - 1.0).abs() < 1e-12);
/// # Ok::<(), QumatError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Running a flow against a memory
// Demonstrates the builder API, the simulator, and probability
// extraction from the register-structured memory.
/// ```
/// use qumat::{Control, FlowBuilder, FlowOp, QuantumMemory, Simulator, TargetForm};
///
/// // Bell pair: H on qubit 0, then X on qubit 1 controlled by qubit 0.
/// let flow = FlowBuilder::new()
///     .add_op(FlowOp::gate("h", TargetForm::Index(0)))
///     .add_op(FlowOp::controlled_gate(
///         "x",
///         TargetForm::Index(1),
///         vec![Control::one(0)],
///     ))
///     .build();
///
/// let mut memory = QuantumMemory::new(&[("pair", 2)]).expect("layout is valid");
/// let simulator = Simulator::new();
/// match simulator.run(&flow, &mut memory) {
///     Ok(result) => {
///         println!("Flow:\n{}", flow); // Display renders the wire diagram
///         println!("{}", result);
///
///         // The joint state is (|00⟩ + |11⟩)/√2: half the weight at
///         // each end, nothing in between.
///         let probabilities = memory.probabilities();
///         assert!((probabilities[0] - 0.5).abs() < 1e-12);
///         assert!((probabilities[3] - 0.5).abs() < 1e-12);
///         assert!(probabilities[1].abs() < 1e-12);
///         assert!(probabilities[2].abs() < 1e-12);
///     }
///     Err(e) => {
///         eprintln!("Bell flow failed: {}", e);
///         assert!(false, "Bell flow failed"); // Force test failure
///     }
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
