//! Circuit summary pass.

use std::collections::{BTreeMap, BTreeSet};

use alsvid_ir::{Program, ProgramVisitor, Register, VirtualQubit};

/// Static summary of a program: the quantum access paths it declares and a
/// histogram of CNOT counts between virtual qubit pairs.
///
/// One traversal of the program produces both. The pass is pure: the output
/// depends only on the statements, not on traversal order, and ordered
/// containers make every later enumeration deterministic.
#[derive(Debug, Clone, Default)]
pub struct CircuitSummary {
    access_paths: BTreeSet<VirtualQubit>,
    histogram: BTreeMap<(VirtualQubit, VirtualQubit), usize>,
}

impl CircuitSummary {
    /// Summarize a program.
    pub fn of(program: &Program) -> Self {
        let mut summary = Self::default();
        program.accept(&mut summary);
        summary
    }

    /// Every slot of every declared quantum register.
    #[inline]
    pub fn access_paths(&self) -> &BTreeSet<VirtualQubit> {
        &self.access_paths
    }

    /// CNOT counts per (control, target) pair.
    #[inline]
    pub fn histogram(&self) -> &BTreeMap<(VirtualQubit, VirtualQubit), usize> {
        &self.histogram
    }
}

impl ProgramVisitor for CircuitSummary {
    fn visit_register(&mut self, reg: &Register) {
        if reg.is_quantum() {
            for i in 0..reg.size {
                self.access_paths.insert(VirtualQubit::new(&reg.name, i));
            }
        }
    }

    fn visit_cnot(&mut self, control: &VirtualQubit, target: &VirtualQubit) {
        *self
            .histogram
            .entry((control.clone(), target.clone()))
            .or_default() += 1;
    }

    // Gate declarations are templates and contribute nothing; non-CNOT
    // applications are not recorded. Both fall through to the no-op
    // defaults.
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::{GateApp, GateDef};

    fn q(reg: &str, i: u32) -> VirtualQubit {
        VirtualQubit::new(reg, i)
    }

    #[test]
    fn test_registers_expand_to_access_paths() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 3).unwrap();
        prog.add_quantum_register("anc", 1).unwrap();
        prog.add_classical_register("c", 5).unwrap();

        let summary = CircuitSummary::of(&prog);
        let paths: Vec<_> = summary.access_paths().iter().cloned().collect();
        assert_eq!(
            paths,
            vec![q("anc", 0), q("q", 0), q("q", 1), q("q", 2)]
        );
    }

    #[test]
    fn test_histogram_counts_ordered_pairs() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 2).unwrap();
        prog.cnot(q("q", 0), q("q", 1)).unwrap();
        prog.cnot(q("q", 0), q("q", 1)).unwrap();
        prog.cnot(q("q", 1), q("q", 0)).unwrap();

        let summary = CircuitSummary::of(&prog);
        assert_eq!(summary.histogram()[&(q("q", 0), q("q", 1))], 2);
        assert_eq!(summary.histogram()[&(q("q", 1), q("q", 0))], 1);
    }

    #[test]
    fn test_declarations_and_other_gates_ignored() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 2).unwrap();
        prog.declare_gate(GateDef {
            name: "bell".into(),
            params: vec![],
            args: vec!["a".into(), "b".into()],
            body: vec![GateApp {
                name: "cx".into(),
                params: vec![],
                qubits: vec![],
            }],
        });
        prog.apply(GateApp {
            name: "h".into(),
            params: vec![],
            qubits: vec![q("q", 0)],
        })
        .unwrap();

        let summary = CircuitSummary::of(&prog);
        assert!(summary.histogram().is_empty());
        assert_eq!(summary.access_paths().len(), 2);
    }
}
