//! Linear-reversible circuit synthesis.
//!
//! A [`LinearOp`] is an invertible Boolean matrix describing the linear part
//! of a CNOT-dihedral block. Both synthesizers reduce the matrix in place to
//! the identity and return the CNOT sequence realizing the *original*
//! operator: applying the returned gates (first gate first, with
//! `w[target] ^= w[control]` wire semantics) maps the wire state `w` to
//! `A·w`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::device::Device;
use crate::error::{CompileError, CompileResult};

/// An n×n Boolean matrix over GF(2), stored as rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearOp {
    rows: Vec<Vec<bool>>,
}

impl LinearOp {
    /// The n×n identity.
    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| i == j).collect())
            .collect();
        Self { rows }
    }

    /// Build from explicit rows.
    ///
    /// Every row must have length equal to the row count.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> CompileResult<Self> {
        let n = rows.len();
        for row in &rows {
            if row.len() != n {
                return Err(CompileError::ParityLengthMismatch {
                    expected: n,
                    got: row.len(),
                });
            }
        }
        Ok(Self { rows })
    }

    /// The matrix dimension.
    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Check if this is the identity.
    pub fn is_identity(&self) -> bool {
        self.rows
            .iter()
            .enumerate()
            .all(|(i, row)| row.iter().enumerate().all(|(j, &bit)| bit == (i == j)))
    }

    /// XOR row `src` into row `dst`.
    pub fn add_row(&mut self, src: usize, dst: usize) {
        debug_assert_ne!(src, dst);
        let (src_row, dst_row) = if src < dst {
            let (a, b) = self.rows.split_at_mut(dst);
            (&a[src], &mut b[0])
        } else {
            let (a, b) = self.rows.split_at_mut(src);
            (&b[0], &mut a[dst])
        };
        for (d, s) in dst_row.iter_mut().zip(src_row) {
            *d ^= *s;
        }
    }

    /// XOR column `src` into column `dst`.
    pub fn add_col(&mut self, dst: usize, src: usize) {
        debug_assert_ne!(src, dst);
        for row in &mut self.rows {
            let bit = row[src];
            row[dst] ^= bit;
        }
    }
}

impl Index<usize> for LinearOp {
    type Output = Vec<bool>;

    fn index(&self, i: usize) -> &Vec<bool> {
        &self.rows[i]
    }
}

impl IndexMut<usize> for LinearOp {
    fn index_mut(&mut self, i: usize) -> &mut Vec<bool> {
        &mut self.rows[i]
    }
}

impl fmt::Display for LinearOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for &bit in row {
                write!(f, "{}", u8::from(bit))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Synthesize `a` as a CNOT sequence with unconstrained connectivity.
///
/// Gauss–Jordan elimination: the recorded row operations reduce `a` to the
/// identity, and replaying them in reverse as CNOTs realizes the original
/// operator.
pub fn gauss_jordan(a: &mut LinearOp) -> CompileResult<Vec<(u32, u32)>> {
    let n = a.size();
    let mut ops: Vec<(usize, usize)> = vec![];

    for j in 0..n {
        if !a[j][j] {
            let r = (j + 1..n)
                .find(|&r| a[r][j])
                .ok_or(CompileError::SingularMatrix)?;
            a.add_row(r, j);
            ops.push((r, j));
        }
        for r in 0..n {
            if r != j && a[r][j] {
                a.add_row(j, r);
                ops.push((j, r));
            }
        }
    }

    Ok(emit(ops))
}

/// Synthesize `a` as a CNOT sequence restricted to device couplings.
///
/// Gaussian elimination where every long-range row operation is routed along
/// a Steiner path of the coupling graph: a self-restoring ladder of adjacent
/// CNOTs whose net effect is exactly the requested row addition, leaving all
/// intermediate wires untouched. The ladder costs O(d²) CNOTs for a path of
/// length d, trading gate count for compositional correctness.
pub fn steiner_gauss(a: &mut LinearOp, device: &Device) -> CompileResult<Vec<(u32, u32)>> {
    let n = a.size();
    if n != device.num_qubits() as usize {
        return Err(CompileError::SizeMismatch {
            matrix: n,
            device: device.num_qubits(),
        });
    }
    let mut ops: Vec<(usize, usize)> = vec![];

    for j in 0..n {
        if !a[j][j] {
            let r = (j + 1..n)
                .find(|&r| a[r][j])
                .ok_or(CompileError::SingularMatrix)?;
            routed_add_row(a, device, r, j, &mut ops)?;
        }
        for r in 0..n {
            if r != j && a[r][j] {
                routed_add_row(a, device, j, r, &mut ops)?;
            }
        }
    }

    Ok(emit(ops))
}

/// Apply `R[dst] ^= R[src]` through the device, appending every primitive
/// row operation performed to `ops` and mirroring it on `a`.
fn routed_add_row(
    a: &mut LinearOp,
    device: &Device,
    src: usize,
    dst: usize,
    ops: &mut Vec<(usize, usize)>,
) -> CompileResult<()> {
    #[allow(clippy::cast_possible_truncation)]
    let tree = device.steiner(&[dst as u32], src as u32)?;
    // A two-terminal Steiner tree is a path; its pre-order edge list walks
    // from the source row to the destination row.
    let mut path: Vec<usize> = Vec::with_capacity(tree.len() + 1);
    path.push(src);
    for &(_, child) in &tree {
        path.push(child as usize);
    }
    ladder(a, &path, ops);
    Ok(())
}

/// Emit a self-restoring CNOT ladder whose net effect is
/// `R[path.last()] ^= R[path[0]]`.
///
/// For adjacent endpoints this is a single operation. Longer paths split at
/// the midpoint m: with A = (ladder over path[m..]) and B = (ladder over
/// path[..=m]), the sequence B·A·B·A has net matrix
/// (I + E_A)(I + E_B)(I + E_A)(I + E_B) = I + E_A·E_B, which is exactly the
/// endpoint-to-endpoint addition with every interior row restored.
fn ladder(a: &mut LinearOp, path: &[usize], ops: &mut Vec<(usize, usize)>) {
    if path.len() < 2 {
        return;
    }
    if path.len() == 2 {
        a.add_row(path[0], path[1]);
        ops.push((path[0], path[1]));
        return;
    }
    let mid = path.len() / 2;
    for _ in 0..2 {
        ladder(a, &path[..=mid], ops);
        ladder(a, &path[mid..], ops);
    }
}

/// Convert recorded row operations into the emitted CNOT order.
#[allow(clippy::cast_possible_truncation)]
fn emit(mut ops: Vec<(usize, usize)>) -> Vec<(u32, u32)> {
    ops.reverse();
    ops.into_iter()
        .map(|(src, dst)| (src as u32, dst as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(rows: &[&[u8]]) -> LinearOp {
        LinearOp::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&b| b != 0).collect())
                .collect(),
        )
        .unwrap()
    }

    /// Replay CNOTs on symbolic wires and return the realized matrix.
    fn realize(gates: &[(u32, u32)], n: usize) -> LinearOp {
        let mut wires = LinearOp::identity(n);
        for &(control, target) in gates {
            wires.add_row(control as usize, target as usize);
        }
        wires
    }

    #[test]
    fn test_identity_emits_nothing() {
        let mut a = LinearOp::identity(4);
        assert!(gauss_jordan(&mut a).unwrap().is_empty());
        assert!(a.is_identity());
    }

    #[test]
    fn test_gauss_jordan_single_cnot() {
        // w0' = w0 + w1 is one CNOT(1, 0).
        let mut a = mat(&[&[1, 1], &[0, 1]]);
        let gates = gauss_jordan(&mut a).unwrap();
        assert!(a.is_identity());
        assert_eq!(gates, vec![(1, 0)]);
    }

    #[test]
    fn test_gauss_jordan_realizes_input() {
        let original = mat(&[&[1, 1, 0], &[0, 1, 1], &[1, 1, 1]]);
        let mut a = original.clone();
        let gates = gauss_jordan(&mut a).unwrap();
        assert!(a.is_identity());
        assert_eq!(realize(&gates, 3), original);
    }

    #[test]
    fn test_gauss_jordan_rejects_singular() {
        let mut a = mat(&[&[1, 1], &[1, 1]]);
        assert!(matches!(
            gauss_jordan(&mut a),
            Err(CompileError::SingularMatrix)
        ));
    }

    #[test]
    fn test_ladder_restores_interior_rows() {
        let mut a = LinearOp::identity(4);
        let mut ops = vec![];
        ladder(&mut a, &[0, 1, 2, 3], &mut ops);

        // Net effect: row 3 gains row 0, rows 1 and 2 untouched.
        let mut expected = LinearOp::identity(4);
        expected.add_row(0, 3);
        assert_eq!(a, expected);
    }

    #[test]
    fn test_steiner_gauss_realizes_input_on_line() {
        let original = mat(&[&[1, 0, 1], &[0, 1, 1], &[0, 0, 1]]);
        let device = Device::line("line3", 3);
        let mut a = original.clone();
        let gates = steiner_gauss(&mut a, &device).unwrap();
        assert!(a.is_identity());
        assert_eq!(realize(&gates, 3), original);
        for &(c, t) in &gates {
            assert!(device.is_connected(c, t));
        }
    }

    #[test]
    fn test_steiner_gauss_respects_star_topology() {
        // Scrambled identity, so the operator is invertible by construction.
        let mut original = LinearOp::identity(4);
        original.add_row(0, 1);
        original.add_row(2, 3);
        original.add_row(3, 0);
        let device = Device::star("star4", 4);
        let mut a = original.clone();
        let gates = steiner_gauss(&mut a, &device).unwrap();
        assert!(a.is_identity());
        assert_eq!(realize(&gates, 4), original);
        for &(c, t) in &gates {
            assert!(device.is_connected(c, t));
        }
    }

    #[test]
    fn test_steiner_gauss_size_mismatch() {
        let device = Device::line("line3", 3);
        let mut a = LinearOp::identity(2);
        assert!(matches!(
            steiner_gauss(&mut a, &device),
            Err(CompileError::SizeMismatch { .. })
        ));
    }
}
