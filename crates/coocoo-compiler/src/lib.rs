//! Coocoo compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Script source → Lexer → Parser → Resolver → WASM Codegen → CompiledModule
//! ```
//!
//! Every front-end stage runs even when an earlier one failed, so a single
//! call reports every problem in the script. Codegen only runs on a script
//! without errors; warnings never block it.

pub mod env;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod suggest;

use coocoo_lexer::Lexer;
use coocoo_parser::Parser;
use coocoo_types::ir::ResolvedProgram;
use coocoo_types::{
    CompileErrors, CompiledModule, CoocooError, ErrorCode, InputImage, SourceFile, Span,
};
use serde::{Deserialize, Serialize};

pub use reference::{generate_intrinsic_table, generate_reference};
pub use resolver::Resolver;

/// File name used in diagnostics when the caller does not supply one.
pub const DEFAULT_FILE_NAME: &str = "script.coo";

/// Outcome of a compile call in a serialisable shape, for tooling hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub module: Option<CompiledModule>,
    /// Errors and warnings; warnings may be present on success.
    pub errors: CompileErrors,
}

/// Compile a script against the store's `(name, handle)` inputs.
///
/// Diagnostics name [`DEFAULT_FILE_NAME`]; use [`compile_with_inputs`] to
/// name the script.
pub fn compile(source: &str, inputs: &[InputImage]) -> Result<CompiledModule, CompileErrors> {
    compile_with_inputs(source, DEFAULT_FILE_NAME, inputs)
}

/// Compile a script against explicit `(name, handle)` inputs.
pub fn compile_with_inputs(
    source: &str,
    name: &str,
    inputs: &[InputImage],
) -> Result<CompiledModule, CompileErrors> {
    match run(source, name, inputs) {
        (Some(module), _) => Ok(module),
        (None, errors) => Err(errors),
    }
}

/// Compile and wrap the outcome in a [`CompileResult`].
///
/// Warnings of a successful compile are kept in `errors`.
pub fn compile_to_result(source: &str, name: &str, inputs: &[InputImage]) -> CompileResult {
    let (module, errors) = run(source, name, inputs);
    CompileResult {
        success: module.is_some(),
        module,
        errors,
    }
}

/// Run the front end only and return every diagnostic.
pub fn check(source: &str, name: &str, inputs: &[InputImage]) -> CompileErrors {
    front_end(source, name, inputs).1
}

/// Lex, parse and resolve. Later stages run on whatever earlier ones
/// recovered.
fn front_end(source: &str, name: &str, inputs: &[InputImage]) -> (ResolvedProgram, CompileErrors) {
    let source_file = SourceFile::new(name, source);

    let lex = Lexer::new(&source_file).lex();
    let mut errors = lex.errors;

    let parse = Parser::new(lex.tokens, &source_file).parse();
    errors.extend(parse.errors);

    let resolved = Resolver::new(&mut errors, &source_file, inputs).resolve(&parse.program);
    tracing::debug!(
        statements = parse.program.stmts.len(),
        bindings = resolved.bindings.len(),
        channels = resolved.channels.len(),
        textures = resolved.textures.len(),
        "front end finished"
    );

    (resolved, errors)
}

#[tracing::instrument(skip(source, inputs), fields(inputs = inputs.len()))]
fn run(source: &str, name: &str, inputs: &[InputImage]) -> (Option<CompiledModule>, CompileErrors) {
    let (resolved, mut errors) = front_end(source, name, inputs);
    if errors.has_errors() {
        tracing::debug!(
            errors = errors.total_errors,
            warnings = errors.total_warnings,
            "compilation rejected"
        );
        return (None, errors);
    }

    match coocoo_codegen::compile(&resolved) {
        Ok(module) => {
            tracing::debug!(
                bytes = module.wasm.len(),
                sha256 = %module.wasm_sha256,
                warnings = errors.total_warnings,
                "compiled"
            );
            (Some(module), errors)
        }
        Err(e) => {
            let source_line = source.lines().next().unwrap_or("").to_string();
            errors.push_error(CoocooError::new(
                name,
                ErrorCode::LIMIT_EXCEEDED,
                format!("code generation failed: {e}"),
                Span::point(1, 1),
                source_line,
            ));
            (None, errors)
        }
    }
}
