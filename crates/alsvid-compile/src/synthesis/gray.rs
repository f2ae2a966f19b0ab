//! CNOT-dihedral re-synthesis.
//!
//! Both entry points take a phase polynomial (a list of [`PhaseTerm`]s) plus
//! the block's overall linear operator and produce an equivalent sequence of
//! CNOTs and Z-rotations. [`gray_synth`] assumes full connectivity;
//! [`gray_steiner`] shares the same recursion but routes every CNOT along
//! Steiner trees of a device coupling graph.
//!
//! The recursion repeatedly splits the pending terms on the parity bit that
//! divides them most unevenly, so large homogeneous groups stay together and
//! shared CNOTs are amortized across terms, in the manner of a Gray-code
//! traversal of the parity space.

use std::collections::VecDeque;
use tracing::debug;

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::synthesis::linear::{LinearOp, gauss_jordan, steiner_gauss};
use crate::synthesis::phase::{
    DihedralGate, Partition, PhaseTerm, adjust_vectors, find_best_split, split,
};

/// How the singleton case discharges a parity onto its target wire.
enum Router<'a> {
    /// Emit one CNOT per set bit, directly into the target.
    Direct,
    /// Route CNOTs along Steiner trees of the device.
    Steiner(&'a Device),
}

/// Synthesize a phase polynomial and linear operator over full connectivity.
///
/// `a` is reduced to the identity in place; the returned gates realize the
/// rotations of `f` followed by the original linear operator. Terms with
/// equal parities are combined on entry (their angles add exactly), and
/// terms whose combined angle is zero are dropped.
///
/// The pivot choice is canonical: the first index (in ascending order)
/// splitting the pending terms most unevenly. For a single two-qubit term
/// `([1, 1], θ)` this pivots on index 0 and discharges onto qubit 0, i.e.
/// `cx q1, q0; rz(θ) q0` plus the linear correction.
///
/// # Errors
///
/// [`CompileError::ParityLengthMismatch`] or [`CompileError::ZeroParity`]
/// for malformed terms; [`CompileError::SingularMatrix`] if `a` is not
/// invertible; [`CompileError::InvariantViolation`] if the recursion runs
/// out of pivots, which well-formed inputs never trigger.
pub fn gray_synth(f: Vec<PhaseTerm>, a: &mut LinearOp) -> CompileResult<Vec<DihedralGate>> {
    let mut gates = synth(f, a, &Router::Direct)?;
    for (control, target) in gauss_jordan(a)? {
        gates.push(DihedralGate::Cx { control, target });
    }
    Ok(gates)
}

/// Synthesize a phase polynomial and linear operator onto a device.
///
/// Same recursion as [`gray_synth`]; every CNOT is emitted along a coupling
/// of `device`, and the final linear correction uses the Steiner-routed
/// synthesizer. The operator dimension must match the device qubit count.
///
/// # Errors
///
/// As [`gray_synth`], plus [`CompileError::SizeMismatch`] and
/// [`CompileError::DisconnectedDevice`].
pub fn gray_steiner(
    f: Vec<PhaseTerm>,
    a: &mut LinearOp,
    device: &Device,
) -> CompileResult<Vec<DihedralGate>> {
    if a.size() != device.num_qubits() as usize {
        return Err(CompileError::SizeMismatch {
            matrix: a.size(),
            device: device.num_qubits(),
        });
    }
    let mut gates = synth(f, a, &Router::Steiner(device))?;
    for (control, target) in steiner_gauss(a, device)? {
        gates.push(DihedralGate::Cx { control, target });
    }
    Ok(gates)
}

/// Shared recursion skeleton over the partition work stack.
fn synth(
    f: Vec<PhaseTerm>,
    a: &mut LinearOp,
    router: &Router<'_>,
) -> CompileResult<Vec<DihedralGate>> {
    let n = a.size();
    let f = normalize(f, n)?;
    debug!(terms = f.len(), qubits = n, "synthesizing phase polynomial");

    let mut gates: Vec<DihedralGate> = vec![];
    let mut stack: VecDeque<Partition> = VecDeque::new();
    #[allow(clippy::cast_possible_truncation)]
    stack.push_front(Partition {
        target: None,
        remaining: (0..n as u32).collect(),
        terms: f,
    });

    while let Some(mut partition) = stack.pop_front() {
        if partition.terms.is_empty() {
            continue;
        }

        if let (1, Some(target)) = (partition.terms.len(), partition.target) {
            // Shortcut: a lone term is discharged straight onto its target.
            let term = partition.terms.remove(0);
            discharge(term, target, a, &mut stack, &mut gates, router)?;
            continue;
        }

        let Some(pivot) = find_best_split(&partition.terms, &partition.remaining) else {
            return Err(CompileError::InvariantViolation {
                pending: partition.terms.len(),
            });
        };

        let (zeros, ones) = split(partition.terms, pivot);
        partition.remaining.remove(&pivot);

        // The first pivot establishes which qubit carries the rotations.
        stack.push_front(Partition {
            target: partition.target.or(Some(pivot)),
            remaining: partition.remaining.clone(),
            terms: ones,
        });
        // Zeros go on top so they are processed first.
        stack.push_front(Partition {
            target: partition.target,
            remaining: partition.remaining,
            terms: zeros,
        });
    }

    Ok(gates)
}

/// Emit the CNOTs folding a lone term's parity onto `target`, then the
/// rotation itself.
fn discharge(
    term: PhaseTerm,
    target: u32,
    a: &mut LinearOp,
    stack: &mut VecDeque<Partition>,
    gates: &mut Vec<DihedralGate>,
    router: &Router<'_>,
) -> CompileResult<()> {
    debug_assert!(
        term.parity[target as usize],
        "partition target must carry its terms' parity"
    );
    match router {
        Router::Direct => {
            #[allow(clippy::cast_possible_truncation)]
            for control in (0..term.parity.len() as u32).filter(|&c| c != target) {
                if term.parity[control as usize] {
                    emit_cx(control, target, a, stack, gates);
                }
            }
        }
        Router::Steiner(device) => {
            #[allow(clippy::cast_possible_truncation)]
            let terminals: Vec<u32> = (0..term.parity.len() as u32)
                .filter(|&c| c != target && term.parity[c as usize])
                .collect();
            let tree = device.steiner(&terminals, target)?;

            // Fill sweep, parents before children: give every Steiner point
            // a copy of the parity flowing toward the root. Ancestors are
            // filled before their descendants depend on them.
            for &(parent, child) in &tree {
                if !term.parity[child as usize] {
                    emit_cx(child, parent, a, stack, gates);
                }
            }
            // Zero sweep, children before parents: fold every vertex into
            // its parent, concentrating the parity at the root.
            for &(parent, child) in tree.iter().rev() {
                emit_cx(child, parent, a, stack, gates);
            }
        }
    }

    gates.push(DihedralGate::Rz {
        angle: term.angle,
        target,
    });
    Ok(())
}

/// Emit one CNOT, updating every pending parity vector and the linear
/// operator to reflect the new wire contents.
fn emit_cx(
    control: u32,
    target: u32,
    a: &mut LinearOp,
    stack: &mut VecDeque<Partition>,
    gates: &mut Vec<DihedralGate>,
) {
    gates.push(DihedralGate::Cx { control, target });
    adjust_vectors(control, target, stack);
    a.add_col(control as usize, target as usize);
}

/// Validate term shapes and combine duplicate parities.
///
/// Two terms with identical parities can never be separated by any pivot,
/// so they are merged up front; exact angle arithmetic makes the merge
/// lossless. Terms that cancel to a zero angle are dropped.
fn normalize(f: Vec<PhaseTerm>, n: usize) -> CompileResult<Vec<PhaseTerm>> {
    let mut merged: Vec<PhaseTerm> = Vec::with_capacity(f.len());
    for (i, term) in f.into_iter().enumerate() {
        if term.parity.len() != n {
            return Err(CompileError::ParityLengthMismatch {
                expected: n,
                got: term.parity.len(),
            });
        }
        if !term.parity.contains(&true) {
            return Err(CompileError::ZeroParity(i));
        }
        match merged.iter_mut().find(|m| m.parity == term.parity) {
            Some(existing) => existing.angle += term.angle,
            None => merged.push(term),
        }
    }
    merged.retain(|term| !term.angle.is_zero());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::Angle;

    fn term(bits: &[u8], angle: Angle) -> PhaseTerm {
        PhaseTerm::new(bits.iter().map(|&b| b != 0).collect(), angle)
    }

    #[test]
    fn test_empty_input_identity_operator() {
        let mut a = LinearOp::identity(3);
        let gates = gray_synth(vec![], &mut a).unwrap();
        assert!(gates.is_empty());
        assert!(a.is_identity());
    }

    #[test]
    fn test_single_qubit_phase() {
        let mut a = LinearOp::identity(1);
        let theta = Angle::pi_over(4);
        let gates = gray_synth(vec![term(&[1], theta)], &mut a).unwrap();
        assert_eq!(
            gates,
            vec![DihedralGate::Rz {
                angle: theta,
                target: 0
            }]
        );
    }

    #[test]
    fn test_two_qubit_parity_canonical_form() {
        let mut a = LinearOp::identity(2);
        let theta = Angle::pi_over(2);
        let gates = gray_synth(vec![term(&[1, 1], theta)], &mut a).unwrap();
        // Pivot 0 carries the rotation; the trailing CNOT restores the
        // identity linear part.
        assert_eq!(
            gates,
            vec![
                DihedralGate::Cx {
                    control: 1,
                    target: 0
                },
                DihedralGate::Rz {
                    angle: theta,
                    target: 0
                },
                DihedralGate::Cx {
                    control: 1,
                    target: 0
                },
            ]
        );
        assert!(a.is_identity());
    }

    #[test]
    fn test_equal_parities_merge() {
        let mut a = LinearOp::identity(2);
        let gates = gray_synth(
            vec![
                term(&[1, 1], Angle::pi_over(4)),
                term(&[1, 1], Angle::pi_over(4)),
            ],
            &mut a,
        )
        .unwrap();
        let rotations: Vec<_> = gates
            .iter()
            .filter_map(|g| match g {
                DihedralGate::Rz { angle, .. } => Some(*angle),
                DihedralGate::Cx { .. } => None,
            })
            .collect();
        assert_eq!(rotations, vec![Angle::pi_over(2)]);
    }

    #[test]
    fn test_cancelling_parities_drop() {
        let mut a = LinearOp::identity(2);
        let gates = gray_synth(
            vec![
                term(&[1, 0], Angle::pi_over(4)),
                term(&[1, 0], -Angle::pi_over(4)),
            ],
            &mut a,
        )
        .unwrap();
        assert!(gates.is_empty());
    }

    #[test]
    fn test_rejects_bad_terms() {
        let mut a = LinearOp::identity(2);
        assert!(matches!(
            gray_synth(vec![term(&[1], Angle::pi())], &mut a),
            Err(CompileError::ParityLengthMismatch { .. })
        ));
        let mut a = LinearOp::identity(2);
        assert!(matches!(
            gray_synth(vec![term(&[0, 0], Angle::pi())], &mut a),
            Err(CompileError::ZeroParity(0))
        ));
    }

    #[test]
    fn test_gray_steiner_size_mismatch() {
        let device = Device::line("line3", 3);
        let mut a = LinearOp::identity(2);
        assert!(matches!(
            gray_steiner(vec![], &mut a, &device),
            Err(CompileError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_gray_steiner_line_parity() {
        // Parity x0⊕x2 on a line must route through qubit 1.
        let device = Device::line("line3", 3);
        let mut a = LinearOp::identity(3);
        let theta = Angle::pi_over(4);
        let gates = gray_steiner(vec![term(&[1, 0, 1], theta)], &mut a, &device).unwrap();

        assert!(a.is_identity());
        let allowed = [(0, 1), (1, 0), (1, 2), (2, 1)];
        for gate in &gates {
            match gate {
                DihedralGate::Cx { control, target } => {
                    assert!(allowed.contains(&(*control, *target)), "bad edge {gate}");
                }
                DihedralGate::Rz { angle, target } => {
                    assert_eq!((*angle, *target), (theta, 0));
                }
            }
        }
        assert_eq!(
            gates
                .iter()
                .filter(|g| matches!(g, DihedralGate::Rz { .. }))
                .count(),
            1
        );
    }
}
