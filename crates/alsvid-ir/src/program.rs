//! Flat, tagged-variant program representation.
//!
//! A [`Program`] is the output of the surface-language front end: an ordered
//! list of register declarations, gate declarations, and gate applications.
//! Compilation passes traverse it through the [`ProgramVisitor`] seam rather
//! than matching on statements directly, so new passes can be added without
//! touching this crate.

use serde::{Deserialize, Serialize};

use crate::angle::Angle;
use crate::error::{IrError, IrResult};
use crate::qubit::VirtualQubit;
use crate::visitor::ProgramVisitor;

/// Whether a register holds qubits or classical bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterKind {
    /// A quantum register.
    Quantum,
    /// A classical register.
    Classical,
}

/// A register declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Register {
    /// Declared name.
    pub name: String,
    /// Number of slots.
    pub size: u32,
    /// Quantum or classical.
    pub kind: RegisterKind,
}

impl Register {
    /// Check if this is a quantum register.
    #[inline]
    pub fn is_quantum(&self) -> bool {
        self.kind == RegisterKind::Quantum
    }
}

/// A gate application in executable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateApp {
    /// Gate name as written in the source.
    pub name: String,
    /// Rotation parameters, if any.
    pub params: Vec<Angle>,
    /// Qubit operands.
    pub qubits: Vec<VirtualQubit>,
}

/// A gate declaration (template).
///
/// Bodies reference the declaration's formal arguments by name; they are
/// never walked by analysis passes, which only see gate *applications* in
/// executable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDef {
    /// Declared gate name.
    pub name: String,
    /// Formal rotation parameters.
    pub params: Vec<String>,
    /// Formal qubit arguments.
    pub args: Vec<String>,
    /// Body applications over the formal arguments.
    pub body: Vec<GateApp>,
}

/// A single program statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// A register declaration.
    Register(Register),
    /// A gate declaration.
    GateDef(GateDef),
    /// A CNOT application. Kept as its own variant so passes that only care
    /// about two-qubit structure can dispatch without string matching.
    Cnot {
        /// Control qubit.
        control: VirtualQubit,
        /// Target qubit.
        target: VirtualQubit,
    },
    /// Any other gate application.
    Gate(GateApp),
}

/// A complete program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    name: String,
    statements: Vec<Stmt>,
}

impl Program {
    /// Create a new empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statements: vec![],
        }
    }

    /// Get the program name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the statements in source order.
    #[inline]
    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// Declare a quantum register of the given size.
    pub fn add_quantum_register(&mut self, name: impl Into<String>, size: u32) -> IrResult<()> {
        self.add_register(name.into(), size, RegisterKind::Quantum)
    }

    /// Declare a classical register of the given size.
    pub fn add_classical_register(&mut self, name: impl Into<String>, size: u32) -> IrResult<()> {
        self.add_register(name.into(), size, RegisterKind::Classical)
    }

    fn add_register(&mut self, name: String, size: u32, kind: RegisterKind) -> IrResult<()> {
        if self.find_register(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        self.statements
            .push(Stmt::Register(Register { name, size, kind }));
        Ok(())
    }

    /// Declare a gate template. The body is not validated against declared
    /// registers; it ranges over the template's formal arguments.
    pub fn declare_gate(&mut self, def: GateDef) {
        self.statements.push(Stmt::GateDef(def));
    }

    /// Append a CNOT application.
    pub fn cnot(&mut self, control: VirtualQubit, target: VirtualQubit) -> IrResult<()> {
        self.check_qubit(&control)?;
        self.check_qubit(&target)?;
        if control == target {
            return Err(IrError::DuplicateQubit(control));
        }
        self.statements.push(Stmt::Cnot { control, target });
        Ok(())
    }

    /// Append a generic gate application.
    pub fn apply(&mut self, app: GateApp) -> IrResult<()> {
        for (i, qubit) in app.qubits.iter().enumerate() {
            self.check_qubit(qubit)?;
            if app.qubits[..i].contains(qubit) {
                return Err(IrError::DuplicateQubit(qubit.clone()));
            }
        }
        self.statements.push(Stmt::Gate(app));
        Ok(())
    }

    /// Walk the program, dispatching each statement to the visitor exactly
    /// once in source order.
    pub fn accept<V: ProgramVisitor>(&self, visitor: &mut V) {
        for stmt in &self.statements {
            match stmt {
                Stmt::Register(reg) => visitor.visit_register(reg),
                Stmt::GateDef(def) => visitor.visit_gate_def(def),
                Stmt::Cnot { control, target } => visitor.visit_cnot(control, target),
                Stmt::Gate(app) => visitor.visit_gate(app),
            }
        }
    }

    fn find_register(&self, name: &str) -> Option<&Register> {
        self.statements.iter().find_map(|stmt| match stmt {
            Stmt::Register(reg) if reg.name == name => Some(reg),
            _ => None,
        })
    }

    fn check_qubit(&self, qubit: &VirtualQubit) -> IrResult<()> {
        let reg = self
            .find_register(&qubit.register)
            .ok_or_else(|| IrError::UnknownRegister(qubit.register.clone()))?;
        if !reg.is_quantum() {
            return Err(IrError::NotQuantum(reg.name.clone()));
        }
        if qubit.index >= reg.size {
            return Err(IrError::IndexOutOfRange {
                register: reg.name.clone(),
                index: qubit.index,
                size: reg.size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(reg: &str, i: u32) -> VirtualQubit {
        VirtualQubit::new(reg, i)
    }

    #[test]
    fn test_register_validation() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 2).unwrap();

        assert!(matches!(
            prog.add_quantum_register("q", 3),
            Err(IrError::DuplicateRegister(_))
        ));
        assert!(matches!(
            prog.cnot(q("q", 0), q("r", 0)),
            Err(IrError::UnknownRegister(_))
        ));
        assert!(matches!(
            prog.cnot(q("q", 0), q("q", 2)),
            Err(IrError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            prog.cnot(q("q", 1), q("q", 1)),
            Err(IrError::DuplicateQubit(_))
        ));
    }

    #[test]
    fn test_classical_register_rejected_as_operand() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 1).unwrap();
        prog.add_classical_register("c", 1).unwrap();

        assert!(matches!(
            prog.cnot(q("q", 0), q("c", 0)),
            Err(IrError::NotQuantum(_))
        ));
    }

    #[test]
    fn test_statements_in_source_order() {
        let mut prog = Program::new("test");
        prog.add_quantum_register("q", 2).unwrap();
        prog.cnot(q("q", 0), q("q", 1)).unwrap();
        prog.apply(GateApp {
            name: "h".into(),
            params: vec![],
            qubits: vec![q("q", 0)],
        })
        .unwrap();

        assert_eq!(prog.statements().len(), 3);
        assert!(matches!(prog.statements()[1], Stmt::Cnot { .. }));
    }
}
