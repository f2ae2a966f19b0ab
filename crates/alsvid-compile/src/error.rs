//! Error types for the compile crate.

use thiserror::Error;

/// Errors that can occur during layout selection or synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A physical qubit id is outside the device.
    #[error("Qubit {qubit} is out of range for device with {num_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit id.
        qubit: u32,
        /// The device qubit count.
        num_qubits: u32,
    },

    /// A coupling fidelity is outside `(0, 1]`.
    #[error("Coupling fidelity {0} is not in (0, 1]")]
    InvalidFidelity(f64),

    /// A coupling connects a qubit to itself.
    #[error("Coupling ({control}, {target}) connects a qubit to itself")]
    InvalidCoupling {
        /// Control endpoint.
        control: u32,
        /// Target endpoint.
        target: u32,
    },

    /// The coupling graph does not connect the qubits a query spans.
    #[error("Device '{device}' has no coupling path reaching qubit {qubit}")]
    DisconnectedDevice {
        /// The device name.
        device: String,
        /// A qubit that could not be reached.
        qubit: u32,
    },

    /// A parity vector does not match the operator dimension.
    #[error("Parity vector has length {got}, expected {expected}")]
    ParityLengthMismatch {
        /// The operator dimension.
        expected: usize,
        /// The offending vector's length.
        got: usize,
    },

    /// A parity vector has no set bits.
    #[error("Parity term {0} has no set bits; global phases cannot be synthesized")]
    ZeroParity(usize),

    /// The linear operator dimension does not match the device.
    #[error("Linear operator is {matrix}×{matrix} but device has {device} qubits")]
    SizeMismatch {
        /// The operator dimension.
        matrix: usize,
        /// The device qubit count.
        device: u32,
    },

    /// The linear operator is not invertible.
    #[error("Linear operator is singular and cannot be synthesized")]
    SingularMatrix,

    /// Synthesis reached a partition with pending terms but no pivot left.
    /// Unreachable for well-formed inputs with distinct, non-zero parities.
    #[error("No pivot indices remain but {pending} parity terms are pending")]
    InvariantViolation {
        /// Number of terms still awaiting discharge.
        pending: usize,
    },
}

/// Result type for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
