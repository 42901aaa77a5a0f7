//! Token types for the Coocoo lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the script language and
//! [`Token`], which pairs a kind with a source [`Span`].

use coocoo_types::Span;
use std::fmt;

/// Reserved identifiers. `export` is the only one.
pub const ALL_KEYWORDS: &[&str] = &["export"];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Unsigned integer literal. Values up to `2^31` are accepted so that
    /// the parser can fold a leading `-` into `i32::MIN`.
    NumberLit(u32),

    // ── Identifiers ──────────────────────────────────────────

    /// Binding, input image, intrinsic, material or channel name.
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `export`
    Export,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Eq,
    /// `-`
    Minus,

    /// End of input.
    Eof,
}

impl TokenKind {
    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        match text {
            "export" => Some(TokenKind::Export),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Export)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::NumberLit(n) => write!(f, "{n}"),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Export => f.write_str("export"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
