//! High-level circuit builder API.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// Tolerance on the norm of initialization amplitudes.
const NORM_TOLERANCE: f64 = 1e-8;

/// A quantum circuit of fixed width.
///
/// Instructions are stored in application order. Rotation angles may refer to
/// trainable parameters, so one circuit serves every parameter value of an
/// ansatz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Instructions in application order.
    instructions: Vec<Instruction>,
    /// Parameter count reserved even if no gate references it.
    #[serde(default)]
    declared_parameters: usize,
}

impl Circuit {
    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: vec![],
            declared_parameters: 0,
        }
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        let gate_name = instruction.name().to_string();
        if let Some(gate) = instruction.as_gate() {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name,
                    expected,
                    got,
                });
            }
        }
        for (i, q) in instruction.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    num_qubits: self.num_qubits,
                    gate_name: Some(gate_name),
                });
            }
            if instruction.qubits[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: Some(gate_name),
                });
            }
        }
        self.instructions.push(instruction);
        Ok(self)
    }

    fn gate1(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(gate, qubit))
    }

    fn gate2(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(gate, q1, q2))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::X, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Sdg, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Rx(theta.into()), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Ry(theta.into()), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Rz(theta.into()), qubit)
    }

    /// Apply the general rotation `Rot(φ, θ, ω) = Rz(ω) Ry(θ) Rz(φ)`.
    pub fn rot(
        &mut self,
        phi: impl Into<ParameterExpression>,
        theta: impl Into<ParameterExpression>,
        omega: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.rz(phi, qubit)?.ry(theta, qubit)?.rz(omega, qubit)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CX, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CZ, control, target)
    }

    // =========================================================================
    // State preparation
    // =========================================================================

    /// Prepare the computational basis state `|b_0 b_1 … b_{n-1}⟩`.
    ///
    /// `bits[q]` is the occupation of wire `q`; an X gate is applied to every
    /// wire set to 1.
    pub fn basis_state(&mut self, bits: &[u8]) -> IrResult<&mut Self> {
        if bits.len() != self.num_qubits as usize {
            return Err(IrError::InvalidStatePreparation(format!(
                "basis state has {} bits for {} qubits",
                bits.len(),
                self.num_qubits
            )));
        }
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(IrError::InvalidStatePreparation(format!(
                "basis state entries must be 0 or 1, found {bad}"
            )));
        }
        for (q, _) in bits.iter().enumerate().filter(|(_, b)| **b == 1) {
            self.x(QubitId::from(q))?;
        }
        Ok(self)
    }

    /// Initialize the register to an arbitrary normalized state.
    ///
    /// Amplitude index `i` addresses the basis state whose bit `q` is the
    /// value of wire `q`.
    pub fn initialize(&mut self, amplitudes: Vec<Complex64>) -> IrResult<&mut Self> {
        if !self.instructions.is_empty() {
            return Err(IrError::InvalidStatePreparation(
                "initialize must be the first instruction".into(),
            ));
        }
        let dim = 1_usize.checked_shl(self.num_qubits).ok_or_else(|| {
            IrError::InvalidStatePreparation(format!(
                "cannot address the state space of {} qubits",
                self.num_qubits
            ))
        })?;
        if amplitudes.len() != dim {
            return Err(IrError::InvalidStatePreparation(format!(
                "expected {dim} amplitudes, got {}",
                amplitudes.len()
            )));
        }
        let norm: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(IrError::InvalidStatePreparation(format!(
                "amplitudes have squared norm {norm}, expected 1"
            )));
        }
        let qubits: Vec<QubitId> = (0..self.num_qubits).map(QubitId).collect();
        self.instructions
            .push(Instruction::initialize(amplitudes, qubits));
        Ok(self)
    }

    /// Append every instruction of `other` to this circuit.
    pub fn append(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits != self.num_qubits {
            return Err(IrError::WidthMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        self.declare_parameters(other.declared_parameters);
        for inst in &other.instructions {
            match &inst.kind {
                InstructionKind::Initialize(amps) => {
                    self.initialize(amps.clone())?;
                }
                InstructionKind::Gate(_) => {
                    self.apply(inst.clone())?;
                }
            }
        }
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Length of the parameter vector the circuit expects: the highest
    /// referenced index + 1, or the declared count if larger.
    pub fn num_parameters(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(|i| i.as_gate().and_then(StandardGate::angle))
            .filter_map(|angle| angle.params().last().copied())
            .max()
            .map_or(0, |k| k + 1)
            .max(self.declared_parameters)
    }

    /// Reserve `n` parameters. Unreferenced ones have zero gradient.
    pub fn declare_parameters(&mut self, n: usize) -> &mut Self {
        self.declared_parameters = self.declared_parameters.max(n);
        self
    }

    /// Number of gates whose angle depends on trainable parameters.
    pub fn num_parameterized_gates(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.is_parameterized())
            .count()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        let mut wire_depth = vec![0_usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let level = inst
                .qubits
                .iter()
                .map(|q| wire_depth[q.index()])
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                wire_depth[q.index()] = level;
            }
        }
        wire_depth.into_iter().max().unwrap_or(0)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} qubits)", self.name, self.num_qubits)?;
        for inst in &self.instructions {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}
