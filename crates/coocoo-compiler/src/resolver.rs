//! Resolver: walks a parsed AST, validates it and lowers it to the
//! resolved IR codegen consumes.
//!
//! Entry point: [`Resolver::resolve`].
//!
//! Error codes emitted:
//! - E200: unknown intrinsic
//! - E201: wrong argument count
//! - E202: argument of the wrong kind
//! - E300: unresolved identifier
//! - E301: name bound twice, or an input image rebound
//! - E400 (warning): unknown material type
//! - E401 (warning): channel not listed by the material type
//! - E402: material channel or texture declared twice
//! - E403: a number routed to an output

use std::collections::HashMap;

use coocoo_types::ast::*;
use coocoo_types::ir::{Binding, Operand, ResolvedChannel, ResolvedProgram, ResolvedTexture, Value};
use coocoo_types::{
    CompileErrors, CoocooError, ErrorCode, InputImage, Intrinsic, MaterialType, SourceFile, Span,
    ValueKind,
};

use crate::env::{BindingTable, Conflict, Symbol};
use crate::registry;
use crate::suggest;

// ══════════════════════════════════════════════════════════════════════════════
// Resolver
// ══════════════════════════════════════════════════════════════════════════════

/// Walks a parsed [`Program`] in source order.
///
/// Errors never stop the walk; a binding whose value fails is poisoned so
/// its later uses are not reported a second time.
pub struct Resolver<'a> {
    env: BindingTable,
    errors: &'a mut CompileErrors,
    source: &'a SourceFile,
    out: ResolvedProgram,
    /// `(material, channel)` → span of the first declaration.
    declared_channels: HashMap<(String, String), Span>,
    /// Texture name → span of the first export.
    declared_textures: HashMap<String, Span>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        errors: &'a mut CompileErrors,
        source: &'a SourceFile,
        inputs: &[InputImage],
    ) -> Self {
        Self {
            env: BindingTable::with_inputs(inputs),
            errors,
            source,
            out: ResolvedProgram::default(),
            declared_channels: HashMap::new(),
            declared_textures: HashMap::new(),
        }
    }

    /// Resolve a complete program.
    pub fn resolve(mut self, program: &Program) -> ResolvedProgram {
        for stmt in &program.stmts {
            match stmt {
                Stmt::Bind(bind) => self.resolve_binding(bind),
                Stmt::Channel(decl) => self.resolve_channel(decl),
                Stmt::Export(export) => self.resolve_export(export),
            }
        }
        self.out
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn resolve_binding(&mut self, bind: &BindStmt) {
        let resolved = self.lower_value(&bind.value);

        let symbol = match resolved {
            Some((value, kind)) => {
                let index = self.push_binding(Some(bind.name.name.clone()), kind, value, bind.span);
                Symbol::Local { index, kind }
            }
            None => Symbol::Poisoned,
        };

        match self.env.define(&bind.name.name, symbol, bind.name.span) {
            Ok(()) => {}
            Err(Conflict::Input) => self.error(
                ErrorCode::DUPLICATE_BINDING,
                format!("'{}' is an input image and cannot be rebound", bind.name.name),
                bind.name.span,
                Some("choose a different name for the result".to_string()),
            ),
            Err(Conflict::Binding(first)) => self.error(
                ErrorCode::DUPLICATE_BINDING,
                format!(
                    "'{}' is already bound at line {}",
                    bind.name.name, first.start_line
                ),
                bind.name.span,
                Some("bindings are single-assignment; introduce a new name".to_string()),
            ),
        }
    }

    fn resolve_channel(&mut self, decl: &ChannelDecl) {
        let material_type = MaterialType::parse(&decl.material_type.name);
        self.check_material(&material_type, decl);

        let source = self.lower_output(&decl.value);

        let key = (decl.material.name.clone(), decl.channel.name.clone());
        if let Some(first) = self.declared_channels.get(&key) {
            let message = format!(
                "channel '{}' of material '{}' is already declared at line {}",
                key.1, key.0, first.start_line
            );
            self.error(ErrorCode::DUPLICATE_CHANNEL, message, decl.span, None);
            return;
        }
        self.declared_channels.insert(key, decl.span);

        let Some(source) = source else {
            return;
        };
        self.out.channels.push(ResolvedChannel {
            material: decl.material.name.clone(),
            channel: decl.channel.name.clone(),
            material_type,
            source,
        });
    }

    fn check_material(&mut self, material_type: &MaterialType, decl: &ChannelDecl) {
        if !material_type.is_known() {
            let known = MaterialType::KNOWN.map(|t| t.as_str().to_string());
            let suggestion = suggest::closest(
                &decl.material_type.name,
                known.iter().map(String::as_str),
            )
            .map(|s| format!("did you mean '{s}'?"))
            .unwrap_or_else(|| format!("known material types: {}", known.join(", ")));
            self.warning(
                ErrorCode::UNKNOWN_MATERIAL_TYPE,
                format!("unknown material type '{}'", decl.material_type.name),
                decl.material_type.span,
                Some(suggestion),
            );
        } else if !material_type.has_channel(&decl.channel.name) {
            let channels = material_type.channels();
            let suggestion = suggest::closest(&decl.channel.name, channels.iter().copied())
                .map(|s| format!("did you mean '{s}'?"))
                .unwrap_or_else(|| format!("{} channels: {}", material_type, channels.join(", ")));
            self.warning(
                ErrorCode::UNKNOWN_CHANNEL,
                format!(
                    "material type {} has no '{}' channel",
                    material_type, decl.channel.name
                ),
                decl.channel.span,
                Some(suggestion),
            );
        }
    }

    fn resolve_export(&mut self, export: &ExportStmt) {
        for name in &export.names {
            if let Some(first) = self.declared_textures.get(&name.name) {
                let message = format!(
                    "texture '{}' is already exported at line {}",
                    name.name, first.start_line
                );
                self.error(ErrorCode::DUPLICATE_CHANNEL, message, name.span, None);
                continue;
            }
            self.declared_textures.insert(name.name.clone(), name.span);

            let expr = Expr::new(ExprKind::Ident(name.name.clone()), name.span);
            if let Some(source) = self.lower_output(&expr) {
                self.out.textures.push(ResolvedTexture {
                    name: name.name.clone(),
                    source,
                });
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Lower an expression whose handle is written to an output slot.
    fn lower_output(&mut self, expr: &Expr) -> Option<Operand> {
        let (operand, kind) = self.lower_operand(expr)?;
        if kind != ValueKind::Image {
            self.error(
                ErrorCode::NOT_AN_IMAGE,
                "only images can be written to a material channel or texture".to_string(),
                expr.span,
                None,
            );
            return None;
        }
        Some(operand)
    }

    /// Lower an expression used as an argument. Calls become anonymous bindings.
    fn lower_operand(&mut self, expr: &Expr) -> Option<(Operand, ValueKind)> {
        match &expr.kind {
            ExprKind::Number(n) => Some((Operand::Number(*n), ValueKind::Number)),
            ExprKind::Ident(name) => self.lookup(name, expr.span),
            ExprKind::Call { .. } => {
                let (value, kind) = self.lower_value(expr)?;
                let index = self.push_binding(None, kind, value, expr.span);
                Some((Operand::Local(index), kind))
            }
        }
    }

    /// Lower the right-hand side of a binding.
    fn lower_value(&mut self, expr: &Expr) -> Option<(Value, ValueKind)> {
        match &expr.kind {
            ExprKind::Call { callee, args } => self.lower_call(callee, args, expr.span),
            _ => {
                let (operand, kind) = self.lower_operand(expr)?;
                Some((Value::Copy(operand), kind))
            }
        }
    }

    fn lower_call(
        &mut self,
        callee: &Ident,
        args: &[Expr],
        span: Span,
    ) -> Option<(Value, ValueKind)> {
        // Arguments are always resolved so nested problems are reported too.
        let lowered: Vec<Option<(Operand, ValueKind)>> =
            args.iter().map(|arg| self.lower_operand(arg)).collect();

        let Some(intrinsic) = Intrinsic::from_name(&callee.name) else {
            let suggestion = suggest::closest(&callee.name, Intrinsic::ALL.iter().map(|i| i.name()))
                .map(|s| format!("did you mean '{s}'?"));
            self.error(
                ErrorCode::UNKNOWN_FUNCTION,
                format!("unknown function '{}'", callee.name),
                callee.span,
                suggestion,
            );
            return None;
        };

        if args.len() != intrinsic.arity() {
            self.error(
                ErrorCode::ARITY_MISMATCH,
                format!(
                    "{} expects {} argument{}, got {}",
                    intrinsic,
                    intrinsic.arity(),
                    if intrinsic.arity() == 1 { "" } else { "s" },
                    args.len()
                ),
                span,
                Some(registry::signature(intrinsic)),
            );
            return None;
        }

        let mut operands = Vec::with_capacity(args.len());
        let mut ok = true;
        for ((arg, lowered), (param, expected)) in
            args.iter().zip(lowered).zip(intrinsic.params())
        {
            match lowered {
                Some((operand, kind)) if kind == *expected => operands.push(operand),
                Some((_, kind)) => {
                    self.error(
                        ErrorCode::ARGUMENT_KIND_MISMATCH,
                        format!(
                            "argument '{param}' of {intrinsic} must be a{} {expected}, got a{} {kind}",
                            article(*expected),
                            article(kind)
                        ),
                        arg.span,
                        Some(registry::signature(intrinsic)),
                    );
                    ok = false;
                }
                None => ok = false,
            }
        }

        ok.then(|| {
            (
                Value::Call {
                    intrinsic,
                    args: operands,
                },
                ValueKind::Image,
            )
        })
    }

    fn lookup(&mut self, name: &str, span: Span) -> Option<(Operand, ValueKind)> {
        match self.env.lookup(name) {
            Some(Symbol::Input(handle)) => Some((Operand::Input(handle), ValueKind::Image)),
            Some(Symbol::Local { index, kind }) => Some((Operand::Local(index), kind)),
            Some(Symbol::Poisoned) => None,
            None => {
                let suggestion = suggest::closest(name, self.env.names())
                    .map(|s| format!("did you mean '{s}'?"));
                self.error(
                    ErrorCode::UNRESOLVED_IDENTIFIER,
                    format!("'{name}' is neither a binding nor an input image"),
                    span,
                    suggestion,
                );
                None
            }
        }
    }

    fn push_binding(&mut self, name: Option<String>, kind: ValueKind, value: Value, span: Span) -> u32 {
        let index = self.out.bindings.len() as u32;
        self.out.bindings.push(Binding {
            name,
            kind,
            value,
            span,
        });
        index
    }

    // ══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ══════════════════════════════════════════════════════════════════════

    fn diagnostic(
        &self,
        code: ErrorCode,
        message: String,
        span: Span,
        suggestion: Option<String>,
    ) -> CoocooError {
        let source_line = self.source.line(span.start_line).unwrap_or("");
        let err = CoocooError::new(&self.source.name, code, message, span, source_line);
        match suggestion {
            Some(s) => err.with_suggestion(s),
            None => err,
        }
    }

    fn error(&mut self, code: ErrorCode, message: String, span: Span, suggestion: Option<String>) {
        let err = self.diagnostic(code, message, span, suggestion);
        self.errors.push_error(err);
    }

    fn warning(&mut self, code: ErrorCode, message: String, span: Span, suggestion: Option<String>) {
        let warning = self.diagnostic(code, message, span, suggestion).as_warning();
        self.errors.push_warning(warning);
    }
}

fn article(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Image => "n",
        ValueKind::Number => "",
    }
}
