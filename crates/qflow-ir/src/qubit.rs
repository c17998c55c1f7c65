//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire index of a qubit within a circuit.
///
/// Wires are numbered from zero; wire `q` maps to bit `q` of a statevector
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The wire index as a `usize`, for indexing statevector bits.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", QubitId::from(7_usize)), "q7");
    }

    #[test]
    fn test_qubit_ordering() {
        let mut wires = vec![QubitId(3), QubitId(0), QubitId(2)];
        wires.sort();
        assert_eq!(wires, vec![QubitId(0), QubitId(2), QubitId(3)]);
        assert_eq!(QubitId(2).index(), 2);
    }
}
