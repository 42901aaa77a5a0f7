use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics of each severity kept for reporting.
///
/// Totals keep counting past the cap.
pub const MAX_ERRORS: usize = 50;

/// Diagnostic severity. Only errors block code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Call,
    Scope,
    Material,
    Structure,
}

/// Numeric diagnostic code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_COMMENT: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);

    // ── Calls (E200–E299) ──
    pub const UNKNOWN_FUNCTION: Self = Self(200);
    pub const ARITY_MISMATCH: Self = Self(201);
    pub const ARGUMENT_KIND_MISMATCH: Self = Self(202);

    // ── Scope (E300–E399) ──
    pub const UNRESOLVED_IDENTIFIER: Self = Self(300);
    pub const DUPLICATE_BINDING: Self = Self(301);

    // ── Materials and outputs (E400–E499) ──
    pub const UNKNOWN_MATERIAL_TYPE: Self = Self(400);
    pub const UNKNOWN_CHANNEL: Self = Self(401);
    pub const DUPLICATE_CHANNEL: Self = Self(402);
    pub const NOT_AN_IMAGE: Self = Self(403);

    // ── Structure (E500–E599) ──
    pub const LIMIT_EXCEEDED: Self = Self(500);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Call,
            300..=399 => ErrorCategory::Scope,
            400..=499 => ErrorCategory::Material,
            _ => ErrorCategory::Structure,
        }
    }

    /// Name of the diagnostic in the compiler's error taxonomy.
    pub fn name(self) -> &'static str {
        match self {
            Self::UNEXPECTED_TOKEN | Self::UNTERMINATED_COMMENT | Self::INVALID_NUMBER => {
                "SyntaxError"
            }
            Self::UNKNOWN_FUNCTION => "UnknownFunction",
            Self::ARITY_MISMATCH => "ArityMismatch",
            Self::ARGUMENT_KIND_MISMATCH => "ArgumentKindMismatch",
            Self::UNRESOLVED_IDENTIFIER => "UnresolvedIdentifier",
            Self::DUPLICATE_BINDING => "DuplicateBinding",
            Self::UNKNOWN_MATERIAL_TYPE => "UnknownMaterialType",
            Self::UNKNOWN_CHANNEL => "UnknownChannel",
            Self::DUPLICATE_CHANNEL => "DuplicateChannel",
            Self::NOT_AN_IMAGE => "NotAnImage",
            _ => "LimitExceeded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Call => write!(f, "call"),
            Self::Scope => write!(f, "scope"),
            Self::Material => write!(f, "material"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// A structured Coocoo compiler diagnostic.
///
/// The authoring UI renders these directly; it must not parse free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoocooError {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CoocooError {
    /// Create a new error-severity diagnostic.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Downgrade to a warning.
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for CoocooError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} [{}] {}",
            self.span,
            self.code,
            self.code.name(),
            self.category,
            self.message
        )
    }
}

impl std::error::Error for CoocooError {}

/// Every diagnostic collected during one compile call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<CoocooError>,
    pub warnings: Vec<CoocooError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Route a diagnostic by its severity.
    pub fn push(&mut self, diagnostic: CoocooError) {
        match diagnostic.severity {
            Severity::Error => self.push_error(diagnostic),
            Severity::Warning => self.push_warning(diagnostic),
        }
    }

    pub fn push_error(&mut self, error: CoocooError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: CoocooError) {
        if self.warnings.len() < MAX_ERRORS {
            self.warnings.push(warning);
        }
        self.total_warnings += 1;
    }

    /// Append every diagnostic from a later pipeline stage.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped_errors = other.total_errors - other.errors.len();
        let dropped_warnings = other.total_warnings - other.warnings.len();
        other.errors.into_iter().for_each(|e| self.push_error(e));
        other.warnings.into_iter().for_each(|w| self.push_warning(w));
        self.total_errors += dropped_errors;
        self.total_warnings += dropped_warnings;
    }

    /// Whether any stored diagnostic (error or warning) carries `code`.
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|e| e.code == code)
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in self.errors.iter().chain(self.warnings.iter()) {
            writeln!(f, "{e}")?;
        }
        Ok(())
    }
}
