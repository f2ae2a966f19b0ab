//! CNOT+phase sub-circuit re-synthesis.
//!
//! Split into three layers:
//! - [`phase`]: parity-term and partition data types,
//! - [`linear`]: linear-reversible synthesis of the residual operator,
//! - [`gray`]: the Gray-code recursion tying them together.

pub mod gray;
pub mod linear;
pub mod phase;

pub use gray::{gray_steiner, gray_synth};
pub use linear::{LinearOp, gauss_jordan, steiner_gauss};
pub use phase::{DihedralGate, PhaseTerm};
