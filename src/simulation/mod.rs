// src/simulation/mod.rs

//! Runs flows against a register-structured memory.
//!
//! The simulator steps through a flow's operations, building each gate's
//! full-width operator matrix on demand and applying it to the memory's
//! joint state. On a measurement it samples an outcome for the targeted
//! qubits, collapses the state by partial projection, and records the
//! observed bits. It aborts on the first failing operation and attaches
//! that operation's label to the surfaced error.

mod results;

pub use results::RunResult;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ndarray::Array1;
use num_complex::Complex64;
use num_traits::Zero; // For Complex::zero()
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::core::constants::tolerances::AMPLITUDE_EPSILON;
use crate::core::QumatError;
use crate::flows::{Flow, FlowError, FlowOp};
use crate::memory::QuantumMemory;

/// Steps flows through a memory.
///
/// Measurement outcomes are sampled from the Born distribution with a
/// PRNG seeded deterministically from a hash of the pre-measurement
/// state, so a run over the same flow and initial state reproduces its
/// outcomes exactly.
#[derive(Default)] // Allows Simulator::default() -> Simulator::new()
pub struct Simulator {
    // Future potential configuration options:
    // - seed_source: SeedSource, // For caller-supplied measurement seeds
    // - validation_mode: ValidationMode, // e.g., Off, Basic, Strict
}

impl Simulator {
    /// Creates a new simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a flow against a memory.
    ///
    /// # Arguments
    /// * `flow` - The operation sequence to execute.
    /// * `memory` - The register-structured memory holding the state; it
    ///   is mutated only by operations that complete successfully.
    ///
    /// # Returns
    /// * `Ok(RunResult)` with the measured bits recorded along the way.
    /// * `Err(FlowError)` naming the first failing operation.
    pub fn run(&self, flow: &Flow, memory: &mut QuantumMemory) -> Result<RunResult, FlowError> {
        log::info!(
            target: "qumat::simulation",
            "running flow with {} operations over {} qubits",
            flow.len(),
            memory.noq()
        );
        let noq = memory.noq();
        let mut result = RunResult::new();

        for (index, op) in flow.operations().iter().enumerate() {
            let attach = |source: QumatError| FlowError {
                index,
                label: op.label().map(str::to_string),
                source,
            };
            match op {
                FlowOp::Measure { targets, .. } => {
                    log::debug!(
                        target: "qumat::simulation",
                        "operation {}: measuring {:?}", index, targets
                    );
                    measure(memory, targets, &mut result).map_err(attach)?;
                }
                FlowOp::Gate { name, .. } => {
                    log::debug!(
                        target: "qumat::simulation",
                        "operation {}: applying gate '{}'", index, name
                    );
                    let operator = op.operator(noq).map_err(attach)?;
                    if let Some(matrix) = operator {
                        memory.apply(&matrix).map_err(attach)?;
                    }
                }
            }
        }
        Ok(result)
    }
}

/// Samples an outcome for the targeted qubits, collapses the state and
/// records the observed bits.
fn measure(
    memory: &mut QuantumMemory,
    targets: &[usize],
    result: &mut RunResult,
) -> Result<(), QumatError> {
    if targets.is_empty() {
        return Ok(()); // Nothing to measure
    }
    let noq = memory.noq();
    for target in targets {
        if *target >= noq {
            return Err(QumatError::IndexOutOfRange {
                message: format!(
                    "measured qubit {} lies outside the register of {} qubits",
                    target, noq
                ),
            });
        }
    }

    let amplitudes = memory.state().amplitudes().clone();
    let local_count = targets.len();

    // 1. Marginal weights over the 2^t local outcomes, in target order.
    let mut weights = vec![0.0f64; 1usize << local_count];
    for (index, amplitude) in amplitudes.iter().enumerate() {
        let probability = amplitude.norm_sqr();
        if probability > 0.0 {
            weights[local_outcome(index, noq, targets)] += probability;
        }
    }
    let mut valid_outcomes: Vec<(usize, f64)> = Vec::with_capacity(weights.len());
    let mut total_weight = 0.0;
    for (outcome, weight) in weights.iter().enumerate() {
        if *weight > AMPLITUDE_EPSILON {
            valid_outcomes.push((outcome, *weight));
            total_weight += *weight;
        }
    }
    if valid_outcomes.is_empty() || total_weight < AMPLITUDE_EPSILON {
        return Err(QumatError::StateError {
            message: "measurement found no outcome with non-negligible probability".to_string(),
        });
    }

    // 2. Deterministic seeding from the pre-measurement state bytes.
    let seed = {
        let mut hasher = DefaultHasher::new();
        for amplitude in amplitudes.iter() {
            amplitude.re.to_ne_bytes().hash(&mut hasher);
            amplitude.im.to_ne_bytes().hash(&mut hasher);
        }
        hasher.finish()
    };
    let mut rng = StdRng::seed_from_u64(seed);

    // 3. Outcome selection by cumulative weight.
    let sample: f64 = rng.random::<f64>() * total_weight;
    let mut cumulative = 0.0;
    let mut chosen = valid_outcomes
        .last()
        .map(|(outcome, _)| *outcome)
        .unwrap_or(0);
    for (outcome, weight) in &valid_outcomes {
        cumulative += *weight;
        if sample < cumulative {
            chosen = *outcome;
            break;
        }
    }

    // 4. Partial projection onto the chosen outcome, renormalized.
    let chosen_weight = weights[chosen];
    let scale = Complex64::new(1.0 / chosen_weight.sqrt(), 0.0);
    let mut collapsed = Array1::from_elem(amplitudes.len(), Complex64::zero());
    for (index, amplitude) in amplitudes.iter().enumerate() {
        if local_outcome(index, noq, targets) == chosen {
            collapsed[index] = amplitude * scale;
        }
    }
    memory.state_mut().replace_amplitudes(collapsed)?;

    // 5. Record the observed bit of every targeted qubit.
    for (position, target) in targets.iter().enumerate() {
        let bit = (chosen >> (local_count - 1 - position)) & 1;
        result.record_bit(*target, bit as u8);
    }
    Ok(())
}

/// Packs the bits of `index` at the targeted qubit positions into a
/// local outcome value, first target most significant.
fn local_outcome(index: usize, noq: usize, targets: &[usize]) -> usize {
    let mut outcome = 0usize;
    for target in targets {
        outcome = (outcome << 1) | ((index >> (noq - 1 - target)) & 1);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QubitState;
    use crate::flows::FlowBuilder;
    use crate::operator::{Control, TargetForm};

    #[test]
    fn measuring_a_basis_state_yields_its_bits() -> Result<(), QumatError> {
        let mut memory = QuantumMemory::with_state(
            &[("q", 3)],
            QubitState::from_bitstring("101")?,
        )?;
        let flow = FlowBuilder::new()
            .add_op(FlowOp::measure(vec![0, 1, 2]))
            .build();
        let result = Simulator::new().run(&flow, &mut memory).map_err(|e| e.source)?;
        assert_eq!(result.bit(0), Some(1));
        assert_eq!(result.bit(1), Some(0));
        assert_eq!(result.bit(2), Some(1));
        assert_eq!(result.bitstring(), "101");
        Ok(())
    }

    #[test]
    fn partial_measurement_collapses_only_the_targeted_qubit() -> Result<(), QumatError> {
        // Bell pair: measuring one half must leave the other half equal.
        let mut memory = QuantumMemory::new(&[("pair", 2)])?;
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::controlled_gate(
                "x",
                TargetForm::Index(1),
                vec![Control::one(0)],
            ))
            .add_op(FlowOp::measure(vec![0]))
            .add_op(FlowOp::measure(vec![1]))
            .build();
        let result = Simulator::new().run(&flow, &mut memory).map_err(|e| e.source)?;
        assert_eq!(result.bit(0), result.bit(1), "Bell halves must agree");
        Ok(())
    }

    #[test]
    fn measurement_outcomes_are_deterministic_for_equal_states() -> Result<(), QumatError> {
        let build = || -> Result<RunResult, QumatError> {
            let mut memory = QuantumMemory::new(&[("q", 2)])?;
            let flow = FlowBuilder::new()
                .add_op(FlowOp::gate("h", TargetForm::Index(0)))
                .add_op(FlowOp::gate("h", TargetForm::Index(1)))
                .add_op(FlowOp::measure(vec![0, 1]))
                .build();
            Simulator::new().run(&flow, &mut memory).map_err(|e| e.source)
        };
        assert_eq!(build()?, build()?, "same state must sample the same outcome");
        Ok(())
    }

    #[test]
    fn failing_operation_is_named_in_the_error() {
        let mut memory = QuantumMemory::new(&[("q", 2)]).unwrap();
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::gate("x", TargetForm::Index(5)).with_label("stray"))
            .build();
        match Simulator::new().run(&flow, &mut memory) {
            Err(err) => {
                assert_eq!(err.index, 1);
                assert_eq!(err.label.as_deref(), Some("stray"));
                assert!(matches!(err.source, QumatError::IndexOutOfRange { .. }));
            }
            Ok(_) => panic!("expected the out-of-range target to fail the run"),
        }
    }

    #[test]
    fn empty_measurement_is_a_no_op() -> Result<(), QumatError> {
        let mut memory = QuantumMemory::new(&[("q", 1)])?;
        let flow = FlowBuilder::new().add_op(FlowOp::measure(vec![])).build();
        let result = Simulator::new().run(&flow, &mut memory).map_err(|e| e.source)?;
        assert!(result.measured_bits().is_empty());
        Ok(())
    }
}
