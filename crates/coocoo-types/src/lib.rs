//! Shared types for the Coocoo compiler and runtime.
//!
//! This crate defines source spans, diagnostics, the AST, the resolved IR,
//! the intrinsic catalogue, material types, and the compiled-module metadata
//! every other crate exchanges.

mod error;
mod intrinsic;
mod material;
mod module;
mod span;
pub mod ast;
pub mod ir;

pub use error::{
    CoocooError, CompileErrors, ErrorCategory, ErrorCode, Severity, MAX_ERRORS,
};
pub use intrinsic::{Intrinsic, ValueKind, IMPORT_MODULE};
pub use material::MaterialType;
pub use module::{CompiledModule, Handle, InputImage, MaterialSlot, TextureSlot};
pub use span::{SourceFile, Span};

/// Result type used throughout the Coocoo compiler.
pub type Result<T> = std::result::Result<T, CoocooError>;
