//! Physical device model.
//!
//! A [`Device`] is a coupling graph over dense physical qubit ids, each
//! coupling annotated with a two-qubit gate fidelity. Layout selection
//! consumes the couplings in descending-fidelity order; topology-aware
//! synthesis routes CNOTs along Steiner trees of the graph.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::error::{CompileError, CompileResult};

/// A directed coupling between two physical qubits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coupling {
    /// Control endpoint.
    pub control: u32,
    /// Target endpoint.
    pub target: u32,
    /// Two-qubit gate fidelity, in `(0, 1]`.
    pub fidelity: f64,
}

/// A physical device: qubit count, name, and fidelity-annotated couplings.
///
/// Connectivity queries treat the coupling graph as undirected; the
/// direction of a coupling only matters to layout selection, which matches
/// (control, target) virtual pairs onto (control, target) couplings.
///
/// ## Deserialization
///
/// The adjacency index is derived from the coupling list and skipped during
/// serialization. Call [`rebuild_adjacency`](Self::rebuild_adjacency) after
/// deserializing; without it, connectivity and Steiner queries see an empty
/// graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Identifying name, used in diagnostics.
    name: String,
    /// Number of physical qubits.
    num_qubits: u32,
    /// Couplings in insertion order.
    couplings: Vec<Coupling>,
    /// Undirected adjacency index with sorted neighbor lists.
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
}

impl Device {
    /// Create a device with no couplings.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            couplings: vec![],
            adjacency: FxHashMap::default(),
        }
    }

    /// Get the device name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Add a directed coupling with the given fidelity.
    ///
    /// A coupling that duplicates an existing (control, target) pair is
    /// silently ignored, matching the declared-once semantics of device
    /// descriptions.
    pub fn add_coupling(&mut self, control: u32, target: u32, fidelity: f64) -> CompileResult<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        if control == target {
            return Err(CompileError::InvalidCoupling { control, target });
        }
        if !(fidelity > 0.0 && fidelity <= 1.0) {
            return Err(CompileError::InvalidFidelity(fidelity));
        }
        if self
            .couplings
            .iter()
            .any(|c| c.control == control && c.target == target)
        {
            return Ok(());
        }
        self.insert_coupling(control, target, fidelity);
        Ok(())
    }

    fn insert_coupling(&mut self, control: u32, target: u32, fidelity: f64) {
        self.couplings.push(Coupling {
            control,
            target,
            fidelity,
        });
        Self::link(&mut self.adjacency, control, target);
        Self::link(&mut self.adjacency, target, control);
    }

    fn link(adjacency: &mut FxHashMap<u32, Vec<u32>>, from: u32, to: u32) {
        let neighbors = adjacency.entry(from).or_default();
        if let Err(pos) = neighbors.binary_search(&to) {
            neighbors.insert(pos, to);
        }
    }

    /// Rebuild the adjacency index from the coupling list. Must be called
    /// after deserialization.
    pub fn rebuild_adjacency(&mut self) {
        self.adjacency.clear();
        for i in 0..self.couplings.len() {
            let Coupling {
                control, target, ..
            } = self.couplings[i];
            Self::link(&mut self.adjacency, control, target);
            Self::link(&mut self.adjacency, target, control);
        }
    }

    /// Return a copy of the couplings sorted by descending fidelity, ties
    /// broken by insertion order.
    pub fn couplings(&self) -> Vec<Coupling> {
        let mut sorted = self.couplings.clone();
        sorted.sort_by(|a, b| b.fidelity.total_cmp(&a.fidelity));
        sorted
    }

    /// Check whether two qubits share a coupling, in either direction.
    #[inline]
    pub fn is_connected(&self, a: u32, b: u32) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|neighbors| neighbors.binary_search(&b).is_ok())
    }

    /// Get the neighbors of a qubit in ascending order.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(&qubit)
            .map(|v| v.iter().copied())
            .into_iter()
            .flatten()
    }

    /// Create a linear device 0-1-2-... with uniform fidelity 1.
    pub fn line(name: impl Into<String>, n: u32) -> Self {
        let mut device = Self::new(name, n);
        for i in 0..n.saturating_sub(1) {
            device.insert_coupling(i, i + 1, 1.0);
        }
        device
    }

    /// Create a star device with qubit 0 coupled to all others, uniform
    /// fidelity 1.
    pub fn star(name: impl Into<String>, n: u32) -> Self {
        let mut device = Self::new(name, n);
        for i in 1..n {
            device.insert_coupling(0, i, 1.0);
        }
        device
    }

    /// Create a fully connected device with uniform fidelity 1.
    pub fn full(name: impl Into<String>, n: u32) -> Self {
        let mut device = Self::new(name, n);
        for i in 0..n {
            for j in (i + 1)..n {
                device.insert_coupling(i, j, 1.0);
            }
        }
        device
    }

    /// Compute a Steiner tree rooted at `root` spanning all `terminals`.
    ///
    /// The tree is returned as a sequence of `(parent, child)` edges in
    /// pre-order: forward iteration visits parents before children, reverse
    /// iteration visits children before their ancestors. Non-terminal
    /// (Steiner) vertices appear when they shorten the tree; every leaf is a
    /// terminal. Empty terminals produce an empty tree.
    ///
    /// The tree is grown greedily, repeatedly attaching the terminal closest
    /// to the partial tree along a BFS shortest path. Ties are broken toward
    /// the smallest qubit id, so results are deterministic.
    pub fn steiner(&self, terminals: &[u32], root: u32) -> CompileResult<Vec<(u32, u32)>> {
        self.check_qubit(root)?;
        for &t in terminals {
            self.check_qubit(t)?;
        }

        let mut remaining: BTreeSet<u32> = terminals.iter().copied().filter(|&t| t != root).collect();
        if remaining.is_empty() {
            return Ok(vec![]);
        }

        let mut tree_nodes: BTreeSet<u32> = BTreeSet::from([root]);
        let mut tree_adj: FxHashMap<u32, Vec<u32>> = FxHashMap::default();

        while !remaining.is_empty() {
            let parent = self.bfs_from(&tree_nodes);

            // Closest remaining terminal; ties toward the smallest id.
            let next = remaining
                .iter()
                .filter_map(|&t| parent.get(&t).map(|&(dist, _)| (dist, t)))
                .min()
                .map(|(_, t)| t);

            let Some(next) = next else {
                let qubit = *remaining.first().unwrap_or(&root);
                return Err(CompileError::DisconnectedDevice {
                    device: self.name.clone(),
                    qubit,
                });
            };

            // Attach the path from the terminal back to the tree. Interior
            // path vertices that happen to be terminals are absorbed too.
            let mut v = next;
            while !tree_nodes.contains(&v) {
                let (_, p) = parent[&v];
                Self::link(&mut tree_adj, p, v);
                Self::link(&mut tree_adj, v, p);
                tree_nodes.insert(v);
                remaining.remove(&v);
                v = p;
            }
        }

        // Orient the tree from the root into a pre-order edge list, visiting
        // children in ascending order.
        let mut edges = Vec::with_capacity(tree_nodes.len() - 1);
        let mut visited: FxHashSet<u32> = FxHashSet::from_iter([root]);
        let mut stack: Vec<(u32, u32)> = vec![];
        Self::push_children(&tree_adj, &mut visited, &mut stack, root);
        while let Some((p, v)) = stack.pop() {
            edges.push((p, v));
            Self::push_children(&tree_adj, &mut visited, &mut stack, v);
        }
        Ok(edges)
    }

    /// BFS from every tree node at once; returns `vertex -> (distance,
    /// predecessor)` for all reachable vertices outside the tree.
    fn bfs_from(&self, sources: &BTreeSet<u32>) -> FxHashMap<u32, (u32, u32)> {
        let mut parent: FxHashMap<u32, (u32, u32)> = FxHashMap::default();
        let mut seen: FxHashSet<u32> = sources.iter().copied().collect();
        let mut queue: VecDeque<(u32, u32)> = sources.iter().map(|&v| (v, 0)).collect();

        while let Some((v, dist)) = queue.pop_front() {
            for n in self.neighbors(v) {
                if seen.insert(n) {
                    parent.insert(n, (dist + 1, v));
                    queue.push_back((n, dist + 1));
                }
            }
        }
        parent
    }

    fn push_children(
        tree_adj: &FxHashMap<u32, Vec<u32>>,
        visited: &mut FxHashSet<u32>,
        stack: &mut Vec<(u32, u32)>,
        v: u32,
    ) {
        // Neighbor lists are sorted ascending; push descending so the
        // smallest child is popped first.
        if let Some(kids) = tree_adj.get(&v) {
            for &c in kids.iter().rev() {
                if visited.insert(c) {
                    stack.push((v, c));
                }
            }
        }
    }

    fn check_qubit(&self, qubit: u32) -> CompileResult<()> {
        if qubit >= self.num_qubits {
            return Err(CompileError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }
}
