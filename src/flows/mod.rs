// src/flows/mod.rs

//! Ordered sequences of operations over a joint register.
//!
//! A `Flow` owns only operation descriptors; operator matrices are
//! produced on demand, either one at a time while a simulation steps
//! through the flow or folded into the flow's single unitary. The
//! `FlowBuilder` provides the chaining construction surface, and
//! `Display` renders an ASCII wire diagram.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::matrix::identity;
use crate::core::QumatError;
use crate::gates::{gate_prototype, GateParams};
use crate::operator::{build_operator, Control, OperatorRequest, TargetForm};

/// One step of a flow: a gate application or a measurement request.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOp {
    /// Applies a registered gate, possibly parameterized and controlled.
    Gate {
        /// Registry name (or alias) of the gate.
        name: String,
        /// Parameters matching the prototype's parameter form.
        params: GateParams,
        /// Where the gate acts.
        target: TargetForm,
        /// Controls conditioning the gate; empty for an uncontrolled gate.
        controls: Vec<Control>,
        /// Optional label attached to errors raised by this operation.
        label: Option<String>,
    },
    /// Measures the named qubits in the computational basis.
    Measure {
        /// Global indices of the measured qubits.
        targets: Vec<usize>,
        /// Optional label attached to errors raised by this operation.
        label: Option<String>,
    },
}

impl FlowOp {
    /// An unparameterized, uncontrolled gate application.
    pub fn gate(name: &str, target: TargetForm) -> Self {
        FlowOp::Gate {
            name: name.to_string(),
            params: GateParams::NoParam,
            target,
            controls: Vec::new(),
            label: None,
        }
    }

    /// A controlled gate application.
    pub fn controlled_gate(name: &str, target: TargetForm, controls: Vec<Control>) -> Self {
        FlowOp::Gate {
            name: name.to_string(),
            params: GateParams::NoParam,
            target,
            controls,
            label: None,
        }
    }

    /// A parameterized gate application.
    pub fn parameterized_gate(name: &str, params: GateParams, target: TargetForm) -> Self {
        FlowOp::Gate {
            name: name.to_string(),
            params,
            target,
            controls: Vec::new(),
            label: None,
        }
    }

    /// A measurement of the given qubits.
    pub fn measure(targets: Vec<usize>) -> Self {
        FlowOp::Measure { targets, label: None }
    }

    /// Attaches a label used when surfacing errors from this operation.
    pub fn with_label(mut self, text: &str) -> Self {
        match &mut self {
            FlowOp::Gate { label, .. } | FlowOp::Measure { label, .. } => {
                *label = Some(text.to_string());
            }
        }
        self
    }

    /// The operation's label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            FlowOp::Gate { label, .. } | FlowOp::Measure { label, .. } => label.as_deref(),
        }
    }

    /// All qubit indices this operation mentions.
    pub fn involved_qubits(&self) -> Vec<usize> {
        match self {
            FlowOp::Gate { target, controls, .. } => {
                let mut qubits: Vec<usize> = match target {
                    TargetForm::Index(i) => vec![*i],
                    TargetForm::Range(lo, hi) => (*lo..=*hi).collect(),
                    TargetForm::Tuple(indices) => indices.clone(),
                };
                qubits.extend(controls.iter().map(|c| c.index));
                qubits
            }
            FlowOp::Measure { targets, .. } => targets.clone(),
        }
    }

    /// Produces this operation's full-width operator matrix, or `None`
    /// for a measurement.
    pub fn operator(&self, noq: usize) -> Result<Option<Array2<Complex64>>, QumatError> {
        match self {
            FlowOp::Gate { name, params, target, controls, .. } => {
                let prototype = gate_prototype(name)?;
                let matrix = prototype.matrix(params)?;
                let request = OperatorRequest::controlled(
                    noq,
                    target.clone(),
                    controls.clone(),
                    matrix,
                );
                build_operator(&request).map(Some)
            }
            FlowOp::Measure { .. } => Ok(None),
        }
    }
}

/// An error raised while producing or applying one operation of a flow,
/// carrying the operation's position and label upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowError {
    /// Zero-based position of the failing operation in the flow.
    pub index: usize,
    /// Label of the failing operation, if one was attached.
    pub label: Option<String>,
    /// The underlying failure.
    pub source: QumatError,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "operation {} ('{}'): {}", self.index, label, self.source),
            None => write!(f, "operation {}: {}", self.index, self.source),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// An ordered sequence of operations applied to a joint register.
#[derive(Clone, PartialEq)] // PartialEq useful for testing flows
pub struct Flow {
    /// The unique set of qubit indices involved across all operations.
    qubits: HashSet<usize>,
    /// The ordered operation sequence.
    operations: Vec<FlowOp>,
}

impl Flow {
    /// Creates a new, empty flow.
    pub fn new() -> Self {
        Self { qubits: HashSet::new(), operations: Vec::new() }
    }

    /// Appends an operation, registering the qubits it involves.
    pub fn add_operation(&mut self, op: FlowOp) {
        for qubit in op.involved_qubits() {
            self.qubits.insert(qubit);
        }
        self.operations.push(op);
    }

    /// Appends every operation from an iterator.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = FlowOp>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// The unique qubit indices involved in this flow.
    pub fn qubits(&self) -> &HashSet<usize> {
        &self.qubits
    }

    /// The ordered operation sequence.
    pub fn operations(&self) -> &[FlowOp] {
        &self.operations
    }

    /// Number of operations in the flow.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// `true` if the flow contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Smallest register width able to host every involved qubit.
    pub fn min_width(&self) -> usize {
        self.qubits.iter().max().map(|q| q + 1).unwrap_or(0)
    }

    /// Folds the flow's gate operations into a single operator matrix
    /// via a left-fold product: the first operation sits rightmost.
    ///
    /// # Returns
    /// * `Err(FlowError)` carrying the failing operation's index and
    ///   label; a measurement anywhere in the flow fails because a flow
    ///   with measurements has no single unitary.
    pub fn unitary(&self, noq: usize) -> Result<Array2<Complex64>, FlowError> {
        let dim = 1usize << noq;
        let mut accumulator = identity(dim);
        for (index, op) in self.operations.iter().enumerate() {
            let produced = op.operator(noq).map_err(|source| FlowError {
                index,
                label: op.label().map(str::to_string),
                source,
            })?;
            match produced {
                Some(matrix) => accumulator = matrix.dot(&accumulator),
                None => {
                    return Err(FlowError {
                        index,
                        label: op.label().map(str::to_string),
                        source: QumatError::StateError {
                            message: "flow contains a measurement; its unitary is undefined"
                                .to_string(),
                        },
                    });
                }
            }
        }
        Ok(accumulator)
    }
}

// Implement Default for convenient creation of empty flows.
impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Flow Builder
//-------------------------------------------------------------------------

/// Builds `Flow` instances by method chaining.
pub struct FlowBuilder {
    flow: Flow,
}

impl FlowBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self { flow: Flow::new() }
    }

    /// Adds a single operation and returns `self` for chaining.
    pub fn add_op(mut self, op: FlowOp) -> Self {
        self.flow.add_operation(op);
        self
    }

    /// Adds every operation from an iterator and returns `self`.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = FlowOp>,
    {
        self.flow.add_operations(ops);
        self
    }

    /// Finalizes and returns the built flow.
    pub fn build(self) -> Flow {
        self.flow
    }
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "qumat::Flow[0 operations on 0 qubits]");
        }

        // --- Setup ---
        let ops = &self.operations;
        let num_ops = ops.len();

        let mut sorted_qubits: Vec<usize> = self.qubits.iter().copied().collect();
        sorted_qubits.sort_unstable();
        let num_qubits = sorted_qubits.len();
        let qubit_to_row: HashMap<usize, usize> =
            sorted_qubits.iter().enumerate().map(|(row, q)| (*q, row)).collect();

        let max_label_width = sorted_qubits
            .iter()
            .map(|q| format!("q{}", q).len())
            .max()
            .unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre = total_dashes / 2;
                let post = total_dashes - pre;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre),
                    symbol,
                    H_WIRE.to_string().repeat(post)
                )
            }
        }

        // --- Populate Grids ---
        for (t, op) in ops.iter().enumerate() {
            match op {
                FlowOp::Gate { name, params, target, controls, .. } => {
                    let symbol = format!("{}{}", name.to_uppercase(), params);
                    let target_rows: Vec<usize> = match target {
                        TargetForm::Index(i) => {
                            qubit_to_row.get(i).copied().into_iter().collect()
                        }
                        TargetForm::Range(lo, hi) => (*lo..=*hi)
                            .filter_map(|q| qubit_to_row.get(&q).copied())
                            .collect(),
                        TargetForm::Tuple(indices) => indices
                            .iter()
                            .filter_map(|q| qubit_to_row.get(q).copied())
                            .collect(),
                    };
                    for row in &target_rows {
                        op_grid[*row][t] = format_gate(&symbol);
                    }
                    let mut touched_rows = target_rows;
                    for control in controls {
                        if let Some(row) = qubit_to_row.get(&control.index) {
                            let dot = if control.polarity == '1' { "●" } else { "○" };
                            op_grid[*row][t] = format_gate(dot);
                            touched_rows.push(*row);
                        }
                    }
                    if let (Some(r_min), Some(r_max)) =
                        (touched_rows.iter().min(), touched_rows.iter().max())
                    {
                        for row_vec in v_connect.iter_mut().take(*r_max).skip(*r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                }
                FlowOp::Measure { targets, .. } => {
                    for qubit in targets {
                        if let Some(row) = qubit_to_row.get(qubit) {
                            op_grid[*row][t] = format_gate("M");
                        }
                    }
                }
            }
        }

        // --- Format Output String ---
        writeln!(f, "qumat::Flow[{} operations on {} qubits]", num_ops, num_qubits)?;
        for r in 0..num_qubits {
            let label = format!("q{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding = GATE_WIDTH.saturating_sub(1);
                    let pre = padding / 2;
                    let post = padding - pre;
                    write!(f, "{}{}{}", " ".repeat(pre), connector, " ".repeat(post))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::tolerances::{MATRIX_EPSILON, UNITARITY_EPSILON};
    use crate::core::matrix::{is_unitary, matrices_approx_equal};
    use crate::gates::{hadamard, pauli_x};
    use crate::operator::{enlarge_one, kernel};

    #[test]
    fn builder_tracks_involved_qubits() {
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::controlled_gate(
                "x",
                TargetForm::Index(2),
                vec![Control::one(0)],
            ))
            .build();
        assert_eq!(flow.len(), 2);
        assert_eq!(flow.min_width(), 3);
        assert!(flow.qubits().contains(&0));
        assert!(!flow.qubits().contains(&1));
    }

    #[test]
    fn unitary_is_the_left_fold_of_the_operation_matrices() -> Result<(), QumatError> {
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::controlled_gate(
                "x",
                TargetForm::Index(1),
                vec![Control::one(0)],
            ))
            .build();
        let produced = flow.unitary(2).map_err(|e| e.source)?;

        let first = enlarge_one(2, 0, &hadamard())?;
        let second = kernel(2, &[Control::one(0)], (1, 1), &pauli_x())?;
        let reference = second.dot(&first);
        assert!(matrices_approx_equal(&produced, &reference, MATRIX_EPSILON));
        assert!(is_unitary(&produced, UNITARITY_EPSILON));
        Ok(())
    }

    #[test]
    fn flow_error_carries_the_operation_label() {
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::gate("warp", TargetForm::Index(1)).with_label("mystery-step"))
            .build();
        match flow.unitary(2) {
            Err(err) => {
                assert_eq!(err.index, 1);
                assert_eq!(err.label.as_deref(), Some("mystery-step"));
                assert!(matches!(err.source, QumatError::UnknownGate { .. }));
                let rendered = format!("{}", err);
                assert!(rendered.contains("mystery-step"), "rendered: {}", rendered);
            }
            Ok(_) => panic!("expected the unknown gate to fail the fold"),
        }
    }

    #[test]
    fn measurement_has_no_unitary() {
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("x", TargetForm::Index(0)))
            .add_op(FlowOp::measure(vec![0]))
            .build();
        match flow.unitary(1) {
            Err(err) => assert!(matches!(err.source, QumatError::StateError { .. })),
            Ok(_) => panic!("expected measurement to poison the unitary"),
        }
    }

    #[test]
    fn empty_flow_renders_without_panicking() {
        let rendered = format!("{}", Flow::new());
        assert!(rendered.contains("0 operations"));
    }

    #[test]
    fn diagram_shows_control_dots_and_gate_symbols() {
        let flow = FlowBuilder::new()
            .add_op(FlowOp::gate("h", TargetForm::Index(0)))
            .add_op(FlowOp::controlled_gate(
                "x",
                TargetForm::Index(1),
                vec![Control::one(0), Control::zero(2)],
            ))
            .build();
        let rendered = format!("{}", flow);
        assert!(rendered.contains("H"));
        assert!(rendered.contains("X"));
        assert!(rendered.contains("●"));
        assert!(rendered.contains("○"));
    }
}
