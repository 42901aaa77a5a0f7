//! Resolved program representation handed from the resolver to codegen.
//!
//! Names are gone: inputs are handles, bindings are local indices.

use crate::{Handle, Intrinsic, MaterialType, Span, ValueKind};

/// Operand of a call or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// An input image registered with the store before compilation.
    Input(Handle),
    /// The result of an earlier binding, by index into [`ResolvedProgram::bindings`].
    Local(u32),
    Number(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Call { intrinsic: Intrinsic, args: Vec<Operand> },
    Copy(Operand),
}

/// One evaluated value. Named bindings come from `name = expr;`; nested calls
/// and channel/texture sources produce anonymous bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Option<String>,
    pub kind: ValueKind,
    pub value: Value,
    pub span: Span,
}

/// A channel declaration whose value has been lowered to an operand.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChannel {
    pub material: String,
    pub channel: String,
    pub material_type: MaterialType,
    pub source: Operand,
}

/// A texture-style output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTexture {
    pub name: String,
    pub source: Operand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProgram {
    pub bindings: Vec<Binding>,
    pub channels: Vec<ResolvedChannel>,
    pub textures: Vec<ResolvedTexture>,
}
