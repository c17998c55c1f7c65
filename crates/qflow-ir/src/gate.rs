//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Gates understood by the simulator.
///
/// Rotations follow the `exp(-i θ/2 · G)` convention with generator
/// `G ∈ {X, Y, Z}`, which is what the parameter-shift rule assumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
}

/// Single-qubit Pauli generator of a rotation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generator {
    /// Generator of `Rx`.
    X,
    /// Generator of `Ry`.
    Y,
    /// Generator of `Rz`.
    Z,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX | StandardGate::CZ => 2,
        }
    }

    /// The rotation angle, if this is a rotation gate.
    pub fn angle(&self) -> Option<&ParameterExpression> {
        match self {
            StandardGate::Rx(p) | StandardGate::Ry(p) | StandardGate::Rz(p) => Some(p),
            _ => None,
        }
    }

    /// The Pauli generator, if this is a rotation gate.
    pub fn generator(&self) -> Option<Generator> {
        match self {
            StandardGate::Rx(_) => Some(Generator::X),
            StandardGate::Ry(_) => Some(Generator::Y),
            StandardGate::Rz(_) => Some(Generator::Z),
            _ => None,
        }
    }

    /// Check if this gate's angle depends on trainable parameters.
    pub fn is_parameterized(&self) -> bool {
        self.angle().is_some_and(ParameterExpression::is_trainable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CZ.name(), "cz");

        assert!(!StandardGate::H.is_parameterized());
        assert!(!StandardGate::Rx(ParameterExpression::constant(PI)).is_parameterized());
        assert!(StandardGate::Rx(ParameterExpression::param(0)).is_parameterized());
    }

    #[test]
    fn test_generators() {
        let theta = ParameterExpression::param(0);
        assert_eq!(StandardGate::Rx(theta.clone()).generator(), Some(Generator::X));
        assert_eq!(StandardGate::Ry(theta.clone()).generator(), Some(Generator::Y));
        assert_eq!(StandardGate::Rz(theta).generator(), Some(Generator::Z));
        assert_eq!(StandardGate::CZ.generator(), None);
    }
}
