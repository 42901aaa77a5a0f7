//! Lexer tests: punctuation, literals, identifiers, comments, error
//! recovery, spans and determinism.

use coocoo_lexer::{Lexer, TokenKind};
use coocoo_types::{ErrorCode, SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.coo", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.coo", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_binding_statement() {
    assert_eq!(
        kinds("out = darken(sky, 10);"),
        vec![
            ident("out"),
            TokenKind::Eq,
            ident("darken"),
            TokenKind::LParen,
            ident("sky"),
            TokenKind::Comma,
            TokenKind::NumberLit(10),
            TokenKind::RParen,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_channel_declaration() {
    assert_eq!(
        kinds("(mat1, albedo, PBRMetalness) = out;"),
        vec![
            TokenKind::LParen,
            ident("mat1"),
            TokenKind::Comma,
            ident("albedo"),
            TokenKind::Comma,
            ident("PBRMetalness"),
            TokenKind::RParen,
            TokenKind::Eq,
            ident("out"),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_export_keyword() {
    assert_eq!(
        kinds("export a, b;"),
        vec![
            TokenKind::Export,
            ident("a"),
            TokenKind::Comma,
            ident("b"),
            TokenKind::Semicolon,
        ]
    );
    // Only the exact word is reserved.
    assert_eq!(kinds("exports"), vec![ident("exports")]);
}

#[test]
fn test_negative_number_is_two_tokens() {
    assert_eq!(kinds("-5"), vec![TokenKind::Minus, TokenKind::NumberLit(5)]);
}

#[test]
fn test_identifiers_with_digits_and_underscores() {
    assert_eq!(kinds("_tmp mask_channel_r layer2"), vec![
        ident("_tmp"),
        ident("mask_channel_r"),
        ident("layer2"),
    ]);
}

#[test]
fn test_empty_source_is_just_eof() {
    let sf = SourceFile::new("test.coo", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        kinds("// header\na = b; // trailing"),
        vec![ident("a"), TokenKind::Eq, ident("b"), TokenKind::Semicolon]
    );
}

#[test]
fn test_block_comment_skipped() {
    assert_eq!(
        kinds("a /* spans\nlines */ = b;"),
        vec![ident("a"), TokenKind::Eq, ident("b"), TokenKind::Semicolon]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(error_codes("a = b; /* never closed"), vec![ErrorCode::UNTERMINATED_COMMENT]);
}

// ─────────────────────────────────────────────────────────────────────
// Number literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_number_bounds() {
    assert_eq!(kinds("2147483647"), vec![TokenKind::NumberLit(2147483647)]);
    // Accepted so the parser can build i32::MIN.
    assert_eq!(kinds("2147483648"), vec![TokenKind::NumberLit(2147483648)]);
    assert_eq!(error_codes("4294967296"), vec![ErrorCode::INVALID_NUMBER]);
    assert_eq!(error_codes("99999999999999999999999"), vec![ErrorCode::INVALID_NUMBER]);
}

#[test]
fn test_decimal_rejected() {
    assert_eq!(error_codes("x = darken(a, 1.5);"), vec![ErrorCode::INVALID_NUMBER]);
}

#[test]
fn test_number_with_suffix_rejected() {
    let sf = SourceFile::new("test.coo", "12px");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors[0].code, ErrorCode::INVALID_NUMBER);
    assert_eq!(result.errors.errors[0].span, Span::new(1, 1, 1, 4));
    // One placeholder literal, not a literal plus an identifier.
    assert_eq!(result.tokens.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovery() {
    let sf = SourceFile::new("test.coo", "a = b # c;\nd = e @;");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 2);
    assert!(result
        .errors
        .errors
        .iter()
        .all(|e| e.code == ErrorCode::UNEXPECTED_TOKEN));
    assert_eq!(result.errors.errors[1].span.start_line, 2);
    // Scanning continued past both bad characters.
    assert!(result.tokens.iter().any(|t| t.kind == ident("e")));
}

#[test]
fn test_non_ascii_character_reported_once() {
    let errs = error_codes("a = ü;");
    assert_eq!(errs, vec![ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_error_cap_stops_scanning() {
    let source = "#".repeat(200);
    let sf = SourceFile::new("test.coo", source.as_str());
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, coocoo_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_token_spans() {
    let sf = SourceFile::new("test.coo", "a = b;\n  out = grayscale(a);");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].span, Span::point(1, 1));
    let out = tokens.iter().find(|t| t.kind == ident("out")).unwrap();
    assert_eq!(out.span, Span::new(2, 3, 2, 5));
    let call = tokens.iter().find(|t| t.kind == ident("grayscale")).unwrap();
    assert_eq!(call.span, Span::new(2, 9, 2, 17));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let source = "base = blank_image(255, 128, 0, 255, 4, 4);\n(m, normal, PBRSpecular) = flip_vertical(base);";
    let first = kinds(source);
    for _ in 0..100 {
        assert_eq!(kinds(source), first);
    }
}
