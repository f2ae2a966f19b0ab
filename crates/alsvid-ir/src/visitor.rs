//! Visitor seam for program traversal.

use crate::program::{GateApp, GateDef, Register};
use crate::qubit::VirtualQubit;

/// Capability set for passes over a [`Program`](crate::Program).
///
/// Every method has a no-op default, so a pass only implements the hooks it
/// cares about. [`Program::accept`](crate::Program::accept) drives the
/// traversal and guarantees each statement is dispatched exactly once in
/// source order; no pass should depend on more than that.
pub trait ProgramVisitor {
    /// Called for each register declaration.
    fn visit_register(&mut self, _reg: &Register) {}

    /// Called for each gate declaration. Bodies are templates and are not
    /// walked further.
    fn visit_gate_def(&mut self, _def: &GateDef) {}

    /// Called for each CNOT application in executable code.
    fn visit_cnot(&mut self, _control: &VirtualQubit, _target: &VirtualQubit) {}

    /// Called for each non-CNOT gate application in executable code.
    fn visit_gate(&mut self, _app: &GateApp) {}
}
