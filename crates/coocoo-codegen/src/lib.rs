//! Coocoo WASM code generator: compiles a resolved program to `.wasm`.
//!
//! # Module contract
//!
//! ## Imports
//! One function per intrinsic, all under `env`, in
//! [`coocoo_types::Intrinsic::ALL`] order. Every parameter and result is an
//! i32 (a handle, a dimension or a channel value).
//!
//! ## Exports
//! - `main()` evaluates the script and fills the output slots
//! - `memory` holds the slots; see [`types`] for the layout
//!
//! ## Custom section
//! `coocoo` carries the compiler version.

pub mod compiler;
pub mod error;
pub mod expr;
pub mod stmt;
pub mod types;

pub use compiler::compile;
pub use error::{CodegenError, CodegenResult};
