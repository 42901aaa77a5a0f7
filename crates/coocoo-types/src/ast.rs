//! AST node types for Coocoo scripts.
//!
//! Every node carries a [`Span`] for error reporting. Statements keep source
//! order; the resolver depends on it for single-assignment checks.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Coocoo script: an ordered list of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = expr;`
    Bind(BindStmt),
    /// `(material, channel, Type) = expr;`
    Channel(ChannelDecl),
    /// `export a, b;`
    Export(ExportStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Bind(s) => s.span,
            Stmt::Channel(s) => s.span,
            Stmt::Export(s) => s.span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct BindStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// A material-channel declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDecl {
    pub material: Ident,
    pub channel: Ident,
    pub material_type: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportStmt {
    pub names: Vec<Ident>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Signed 32-bit integer literal.
    Number(i32),
    /// Reference to a binding or an input image.
    Ident(String),
    /// `callee(args...)`
    Call { callee: Ident, args: Vec<Expr> },
}
