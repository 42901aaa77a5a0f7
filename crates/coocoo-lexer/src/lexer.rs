//! Core Coocoo lexer: converts source text to a token stream.
//!
//! - Line (`//`) and block (`/* */`) comments are skipped
//! - Whitespace, including newlines, is insignificant
//! - Error recovery: keeps scanning after a bad character so that one
//!   compile call reports every problem

use coocoo_types::{CompileErrors, CoocooError, ErrorCode, SourceFile, Span, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// Largest literal magnitude the lexer accepts (`-2147483648` is valid).
const MAX_LITERAL: u64 = 1 << 31;

/// The Coocoo lexer.
///
/// Works on byte offsets; spans are mapped to line/column through the
/// [`SourceFile`] only when a token or error is produced.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn span_from(&self, start: usize) -> Span {
        self.source_file.span(start, self.pos)
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = CoocooError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments until the next significant byte.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.pos += 1;
                }
                (Some(b'/'), Some(b'/')) => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    let span = self.source_file.span(start, start + 2);
                    let source_line = self.source_file.line(span.start_line).unwrap_or("");
                    let err = CoocooError::new(
                        &self.source_file.name,
                        ErrorCode::UNTERMINATED_COMMENT,
                        "Unterminated block comment",
                        span,
                        source_line,
                    )
                    .with_suggestion("Close the comment with */");
                    self.errors.push_error(err);
                    return;
                }
                (Some(b'*'), Some(b'/')) => {
                    self.pos += 2;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;
        if self.too_many_errors() {
            self.pos = self.source.len();
        }
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.source_file.span(start, start));
        };

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'=' => TokenKind::Eq,
            b'-' => TokenKind::Minus,
            b'0'..=b'9' => return self.scan_number(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.scan_identifier(start),
            _ => {
                // Step over the whole character, not one byte of it.
                let bad = self.source_file.source[start..].chars().next().unwrap_or('?');
                self.pos = start + bad.len_utf8();
                let span = self.span_from(start);
                self.emit_error(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("Unexpected character '{bad}'"),
                    span,
                );
                return self.scan_token();
            }
        };

        Token::new(kind, self.span_from(start))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize) -> Token {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        let digits_end = self.pos;

        // `1.5`, `12px`: swallow the rest so the error covers the whole literal.
        let malformed = matches!(self.peek(), Some(b'.' | b'a'..=b'z' | b'A'..=b'Z' | b'_'));
        if malformed {
            while let Some(b'0'..=b'9' | b'.' | b'a'..=b'z' | b'A'..=b'Z' | b'_') = self.peek() {
                self.advance();
            }
        }

        let span = self.span_from(start);
        let text = &self.source_file.source[start..self.pos];

        if malformed {
            self.emit_error(
                ErrorCode::INVALID_NUMBER,
                format!("Invalid number literal '{text}': only whole numbers are supported"),
                span,
            );
            return Token::new(TokenKind::NumberLit(0), span);
        }

        match self.source_file.source[start..digits_end].parse::<u64>() {
            Ok(value) if value <= MAX_LITERAL => Token::new(TokenKind::NumberLit(value as u32), span),
            _ => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("Number literal '{text}' does not fit in a 32-bit integer"),
                    span,
                );
                Token::new(TokenKind::NumberLit(0), span)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_from(start);
        let text = &self.source_file.source[start..self.pos];
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));

        Token::new(kind, span)
    }
}
