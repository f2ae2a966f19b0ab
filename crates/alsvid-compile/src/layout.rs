//! Initial layout selection.
//!
//! A [`Layout`] assigns virtual qubits to physical qubits. [`BestFitLayout`]
//! chooses the assignment by matching the most heavily used virtual pairs to
//! the highest-fidelity couplings; [`TrivialLayout`] is the in-order
//! baseline.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use alsvid_ir::{Program, VirtualQubit};

use crate::device::Device;
use crate::summary::CircuitSummary;

/// An injective assignment of virtual qubits to physical qubits.
///
/// Both directions are indexed. Inserting a mapping that conflicts with an
/// existing one on either side removes the stale half first, so the layout
/// can never alias two virtual qubits onto one physical qubit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Vec<(VirtualQubit, u32)>",
    into = "Vec<(VirtualQubit, u32)>"
)]
pub struct Layout {
    virtual_to_physical: FxHashMap<VirtualQubit, u32>,
    physical_to_virtual: FxHashMap<u32, VirtualQubit>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping from virtual to physical qubit.
    ///
    /// Conflicting halves of older mappings are removed to keep both maps
    /// consistent.
    pub fn insert(&mut self, virt: VirtualQubit, physical: u32) {
        if let Some(old_virt) = self.physical_to_virtual.get(&physical) {
            if *old_virt != virt {
                let old_virt = old_virt.clone();
                self.virtual_to_physical.remove(&old_virt);
            }
        }
        if let Some(&old_physical) = self.virtual_to_physical.get(&virt) {
            if old_physical != physical {
                self.physical_to_virtual.remove(&old_physical);
            }
        }
        self.virtual_to_physical.insert(virt.clone(), physical);
        self.physical_to_virtual.insert(physical, virt);
    }

    /// Get the physical qubit assigned to a virtual qubit.
    pub fn get_physical(&self, virt: &VirtualQubit) -> Option<u32> {
        self.virtual_to_physical.get(virt).copied()
    }

    /// Get the virtual qubit assigned to a physical qubit.
    pub fn get_virtual(&self, physical: u32) -> Option<&VirtualQubit> {
        self.physical_to_virtual.get(&physical)
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.virtual_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.virtual_to_physical.is_empty()
    }

    /// Iterate over (virtual, physical) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&VirtualQubit, u32)> + '_ {
        self.virtual_to_physical.iter().map(|(v, &p)| (v, p))
    }

    /// The assignments sorted by virtual qubit.
    pub fn entries(&self) -> Vec<(VirtualQubit, u32)> {
        let mut entries: Vec<_> = self
            .virtual_to_physical
            .iter()
            .map(|(v, &p)| (v.clone(), p))
            .collect();
        entries.sort();
        entries
    }
}

impl From<Vec<(VirtualQubit, u32)>> for Layout {
    fn from(entries: Vec<(VirtualQubit, u32)>) -> Self {
        let mut layout = Layout::new();
        for (virt, physical) in entries {
            layout.insert(virt, physical);
        }
        layout
    }
}

impl From<Layout> for Vec<(VirtualQubit, u32)> {
    fn from(layout: Layout) -> Self {
        layout.entries()
    }
}

/// Best-fit layout generator.
///
/// Approximates a maximum-weight matching between virtual qubit pairs
/// (weighted by their CNOT count) and physical couplings (weighted by
/// fidelity): pairs are considered in descending count order, couplings in
/// descending fidelity order, and each coupling is spent on at most one
/// pair. Performs well on devices with a high degree of connectivity.
pub struct BestFitLayout<'a> {
    device: &'a Device,
}

impl<'a> BestFitLayout<'a> {
    /// Create a generator for the given device.
    pub fn new(device: &'a Device) -> Self {
        Self { device }
    }

    /// Compute a layout for the program.
    ///
    /// If the device has fewer qubits than the program uses, a warning
    /// naming the device is emitted and the partial layout is returned;
    /// callers detect the shortfall by comparing [`Layout::len`] against the
    /// program's access paths.
    pub fn run(&self, program: &Program) -> Layout {
        let summary = CircuitSummary::of(program);
        debug!(
            program = program.name(),
            device = self.device.name(),
            pairs = summary.histogram().len(),
            "fitting histogram onto couplings"
        );
        self.fit(&summary)
    }

    fn fit(&self, summary: &CircuitSummary) -> Layout {
        let mut layout = Layout::new();
        let mut allocated = vec![false; self.device.num_qubits() as usize];

        // Decreasing CNOT count; the histogram's key order breaks ties.
        let mut pairs: Vec<(&(VirtualQubit, VirtualQubit), &usize)> =
            summary.histogram().iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(a.1));

        let mut couplings = self.device.couplings();

        for ((virt_ctrl, virt_tgt), _count) in pairs {
            let mut spent = None;
            for (idx, coupling) in couplings.iter().enumerate() {
                // Honor prior commitments: a mapped endpoint must coincide
                // with the coupling's, an unmapped one needs a free qubit.
                let ctrl_bit = match layout.get_physical(virt_ctrl) {
                    Some(p) if p == coupling.control => p,
                    Some(_) => continue,
                    None if !allocated[coupling.control as usize] => coupling.control,
                    None => continue,
                };
                let tgt_bit = match layout.get_physical(virt_tgt) {
                    Some(p) if p == coupling.target => p,
                    Some(_) => continue,
                    None if !allocated[coupling.target as usize] => coupling.target,
                    None => continue,
                };

                layout.insert(virt_ctrl.clone(), ctrl_bit);
                layout.insert(virt_tgt.clone(), tgt_bit);
                allocated[ctrl_bit as usize] = true;
                allocated[tgt_bit as usize] = true;
                spent = Some(idx);
                break;
            }
            // Each coupling is spent on at most one pair.
            if let Some(idx) = spent {
                couplings.remove(idx);
            }
        }

        // Map every remaining access path to the lowest free qubit.
        for path in summary.access_paths() {
            if layout.get_physical(path).is_some() {
                continue;
            }
            match allocated.iter().position(|&used| !used) {
                Some(free) => {
                    #[allow(clippy::cast_possible_truncation)]
                    layout.insert(path.clone(), free as u32);
                    allocated[free] = true;
                }
                None => {
                    warn!(
                        device = self.device.name(),
                        mapped = layout.len(),
                        "program does not fit on device; returning partial layout"
                    );
                    return layout;
                }
            }
        }

        layout
    }
}

/// Trivial layout generator.
///
/// Assigns access paths to physical qubits in declaration order. The
/// simplest possible strategy; useful as a baseline and for fully connected
/// devices where placement does not matter.
pub struct TrivialLayout<'a> {
    device: &'a Device,
}

impl<'a> TrivialLayout<'a> {
    /// Create a generator for the given device.
    pub fn new(device: &'a Device) -> Self {
        Self { device }
    }

    /// Compute a layout for the program. Same capacity behavior as
    /// [`BestFitLayout::run`].
    pub fn run(&self, program: &Program) -> Layout {
        let summary = CircuitSummary::of(program);
        let mut layout = Layout::new();
        for (i, path) in summary.access_paths().iter().enumerate() {
            if i >= self.device.num_qubits() as usize {
                warn!(
                    device = self.device.name(),
                    mapped = layout.len(),
                    "program does not fit on device; returning partial layout"
                );
                break;
            }
            #[allow(clippy::cast_possible_truncation)]
            layout.insert(path.clone(), i as u32);
        }
        layout
    }
}
