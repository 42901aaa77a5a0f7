//! Codegen error types.

use thiserror::Error;

/// Errors that can occur during WASM code generation.
///
/// The resolver rejects every user mistake, so these indicate a compiler bug
/// or a program too large for the module layout.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),

    /// The generated WASM module failed validation.
    #[error("WASM validation failed: {0}")]
    ValidationFailed(String),

    /// An operand referred to a binding that does not exist.
    #[error("unresolved local: {0}")]
    UnresolvedLocal(u32),

    /// Too many slots or locals for the module layout.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
