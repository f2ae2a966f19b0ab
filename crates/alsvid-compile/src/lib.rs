//! Alsvid Layout and Synthesis Back End
//!
//! This crate turns device-oblivious gate-level programs into circuits that
//! respect a physical device's coupling topology and gate fidelities. It
//! provides the two passes where that adaptation happens:
//!
//! 1. **Initial layout**: [`BestFitLayout`] summarizes a program's two-qubit
//!    structure and assigns the most strongly coupled virtual qubit pairs to
//!    the highest-fidelity physical couplings.
//! 2. **CNOT-dihedral re-synthesis**: [`gray_synth`] and [`gray_steiner`]
//!    rebuild CNOT+phase sub-circuits from their phase-polynomial
//!    representation, the latter routing every CNOT along Steiner trees of
//!    the device.
//!
//! # Example
//!
//! ```rust
//! use alsvid_compile::{BestFitLayout, Device};
//! use alsvid_ir::{Program, VirtualQubit};
//!
//! let mut prog = Program::new("bell");
//! prog.add_quantum_register("q", 2).unwrap();
//! prog.cnot(VirtualQubit::new("q", 0), VirtualQubit::new("q", 1)).unwrap();
//!
//! let device = Device::line("line3", 3);
//! let layout = BestFitLayout::new(&device).run(&prog);
//!
//! assert_eq!(layout.len(), 2);
//! assert_eq!(layout.get_physical(&VirtualQubit::new("q", 0)), Some(0));
//! ```
//!
//! Synthesis operates on [`PhaseTerm`]s and a [`LinearOp`]; the surrounding
//! circuit rewriting (extracting CNOT+phase blocks and splicing the output
//! back in) is the caller's concern.

pub mod device;
pub mod error;
pub mod layout;
pub mod summary;
pub mod synthesis;

pub use device::{Coupling, Device};
pub use error::{CompileError, CompileResult};
pub use layout::{BestFitLayout, Layout, TrivialLayout};
pub use summary::CircuitSummary;
pub use synthesis::{
    DihedralGate, LinearOp, PhaseTerm, gauss_jordan, gray_steiner, gray_synth, steiner_gauss,
};
