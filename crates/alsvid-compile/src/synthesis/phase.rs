//! Parity terms and synthesis partitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use alsvid_ir::Angle;

/// One term of a phase polynomial: a rotation by `angle` applied on the
/// parity `⟨parity, x⟩` of the computational basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTerm {
    /// Parity vector over the qubits, one bit per wire.
    pub parity: Vec<bool>,
    /// Exact rotation angle.
    pub angle: Angle,
}

impl PhaseTerm {
    /// Create a new phase term.
    pub fn new(parity: Vec<bool>, angle: Angle) -> Self {
        Self { parity, angle }
    }
}

impl fmt::Display for PhaseTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*(", self.angle)?;
        for &bit in &self.parity {
            write!(f, "{}", u8::from(bit))?;
        }
        write!(f, ")")
    }
}

/// A gate in a CNOT-dihedral circuit: either a CNOT or a Z-rotation on
/// physical qubit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DihedralGate {
    /// A CNOT gate.
    Cx {
        /// Control qubit.
        control: u32,
        /// Target qubit.
        target: u32,
    },
    /// A Z-rotation.
    Rz {
        /// Exact rotation angle.
        angle: Angle,
        /// Target qubit.
        target: u32,
    },
}

impl fmt::Display for DihedralGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DihedralGate::Cx { control, target } => write!(f, "cx q{control}, q{target}"),
            DihedralGate::Rz { angle, target } => write!(f, "rz({angle}) q{target}"),
        }
    }
}

/// A pending group of phase terms during synthesis.
///
/// Partitions live on an explicit work stack: the recursion mutates sibling
/// partitions still on the stack (see [`adjust_vectors`]), which a
/// call-stack formulation could not express without aliasing mutable
/// borrows.
#[derive(Debug, Clone)]
pub(crate) struct Partition {
    /// Qubit onto which this partition's terms will be discharged as
    /// rotations. Absent until the first pivot establishes it.
    pub target: Option<u32>,
    /// Column indices still available for pivoting.
    pub remaining: BTreeSet<u32>,
    /// Terms belonging to this partition, in stable order.
    pub terms: Vec<PhaseTerm>,
}

/// Fold column `control` into column `target` across every pending parity
/// vector.
///
/// Called after each emitted CNOT so the parities still on the stack keep
/// describing the intended rotations in terms of the evolved wire contents:
/// `w[target] ^= w[control]` on wires is compensated by
/// `v[control] ^= v[target]` on every vector.
pub(crate) fn adjust_vectors(control: u32, target: u32, stack: &mut VecDeque<Partition>) {
    let (c, t) = (control as usize, target as usize);
    for partition in stack {
        for term in &mut partition.terms {
            term.parity[c] ^= term.parity[t];
        }
    }
}

/// Choose the pivot index that splits `terms` most unevenly, maximizing
/// `max(#zeros, #ones)`. Scans `remaining` in ascending order and keeps the
/// first index achieving the maximum, so the choice is deterministic.
pub(crate) fn find_best_split(terms: &[PhaseTerm], remaining: &BTreeSet<u32>) -> Option<u32> {
    let mut best: Option<(usize, u32)> = None;
    for &i in remaining {
        let ones = terms.iter().filter(|t| t.parity[i as usize]).count();
        let score = ones.max(terms.len() - ones);
        if best.is_none_or(|(b, _)| score > b) {
            best = Some((score, i));
        }
    }
    best.map(|(_, i)| i)
}

/// Partition terms by their bit at `index`, preserving relative order.
pub(crate) fn split(terms: Vec<PhaseTerm>, index: u32) -> (Vec<PhaseTerm>, Vec<PhaseTerm>) {
    terms
        .into_iter()
        .partition(|term| !term.parity[index as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(bits: &[u8]) -> PhaseTerm {
        PhaseTerm::new(bits.iter().map(|&b| b != 0).collect(), Angle::pi_over(4))
    }

    #[test]
    fn test_find_best_split_prefers_uneven() {
        let terms = vec![term(&[1, 1]), term(&[1, 0]), term(&[1, 1])];
        let remaining: BTreeSet<u32> = [0, 1].into_iter().collect();
        // Index 0 splits 0/3, index 1 splits 1/2; index 0 wins.
        assert_eq!(find_best_split(&terms, &remaining), Some(0));
    }

    #[test]
    fn test_find_best_split_first_index_on_tie() {
        let terms = vec![term(&[1, 1]), term(&[0, 0])];
        let remaining: BTreeSet<u32> = [0, 1].into_iter().collect();
        assert_eq!(find_best_split(&terms, &remaining), Some(0));
    }

    #[test]
    fn test_find_best_split_empty_remaining() {
        let terms = vec![term(&[1])];
        assert_eq!(find_best_split(&terms, &BTreeSet::new()), None);
    }

    #[test]
    fn test_split_preserves_order() {
        let terms = vec![term(&[1, 0]), term(&[0, 1]), term(&[1, 1]), term(&[0, 0])];
        let (zeros, ones) = split(terms, 0);
        assert_eq!(zeros, vec![term(&[0, 1]), term(&[0, 0])]);
        assert_eq!(ones, vec![term(&[1, 0]), term(&[1, 1])]);
    }

    #[test]
    fn test_adjust_vectors_touches_every_partition() {
        let mut stack: VecDeque<Partition> = VecDeque::new();
        stack.push_back(Partition {
            target: None,
            remaining: BTreeSet::new(),
            terms: vec![term(&[1, 1])],
        });
        stack.push_back(Partition {
            target: Some(0),
            remaining: BTreeSet::new(),
            terms: vec![term(&[0, 1])],
        });

        adjust_vectors(0, 1, &mut stack);
        assert_eq!(stack[0].terms[0].parity, vec![false, true]);
        assert_eq!(stack[1].terms[0].parity, vec![true, true]);
    }

    #[test]
    fn test_display() {
        let gate = DihedralGate::Rz {
            angle: Angle::pi_over(2),
            target: 3,
        };
        assert_eq!(format!("{gate}"), "rz(π/2) q3");
        assert_eq!(format!("{}", term(&[1, 0, 1])), "π/4*(101)");
    }
}
