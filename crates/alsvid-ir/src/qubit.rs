//! Virtual qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual (program-level) qubit: one slot of a declared quantum register.
///
/// Virtual qubits are identified by the declaring register's name and the
/// offset within it. The derived ordering makes them usable as map keys, so
/// layout assignments and gate histograms enumerate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualQubit {
    /// Name of the declaring register.
    pub register: String,
    /// Offset within the register.
    pub index: u32,
}

impl VirtualQubit {
    /// Create a new virtual qubit.
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for VirtualQubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}
