//! Error types for the IR crate.

use crate::qubit::VirtualQubit;
use thiserror::Error;

/// Errors that can occur when building a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A register with this name was already declared.
    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),

    /// A gate operand refers to a register that was never declared.
    #[error("Register '{0}' is not declared")]
    UnknownRegister(String),

    /// A gate operand refers to a classical register.
    #[error("Register '{0}' is classical, expected a quantum register")]
    NotQuantum(String),

    /// A gate operand indexes past the end of its register.
    #[error("Index {index} is out of range for register '{register}' of size {size}")]
    IndexOutOfRange {
        /// The register being indexed.
        register: String,
        /// The offending offset.
        index: u32,
        /// The declared register size.
        size: u32,
    },

    /// The same qubit appears twice in one gate application.
    #[error("Duplicate qubit {0} in gate operands")]
    DuplicateQubit(VirtualQubit),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
