//! Operand and value code generation.
//!
//! Every operand and value leaves exactly one i32 on the WASM operand stack:
//! a handle for images, the literal itself for numbers.

use coocoo_types::ir::{Operand, Value};
use wasm_encoder::{Function, Instruction};

use crate::compiler::FuncContext;
use crate::error::{CodegenError, CodegenResult};

/// Emit instructions for an operand.  Leaves one i32 on the stack.
pub fn emit_operand(operand: &Operand, ctx: &FuncContext, f: &mut Function) -> CodegenResult<()> {
    match *operand {
        Operand::Input(handle) => {
            f.instruction(&Instruction::I32Const(handle.to_wire()));
        }
        Operand::Number(n) => {
            f.instruction(&Instruction::I32Const(n));
        }
        Operand::Local(index) => {
            if index >= ctx.local_count {
                return Err(CodegenError::UnresolvedLocal(index));
            }
            f.instruction(&Instruction::LocalGet(index));
        }
    }
    Ok(())
}

/// Emit instructions for a binding's value.  Leaves one i32 on the stack.
pub fn emit_value(value: &Value, ctx: &FuncContext, f: &mut Function) -> CodegenResult<()> {
    match value {
        Value::Copy(operand) => emit_operand(operand, ctx, f),
        Value::Call { intrinsic, args } => {
            if args.len() != intrinsic.arity() {
                return Err(CodegenError::Internal(format!(
                    "{intrinsic} expects {} arguments, resolver produced {}",
                    intrinsic.arity(),
                    args.len()
                )));
            }
            for arg in args {
                emit_operand(arg, ctx, f)?;
            }
            f.instruction(&Instruction::Call(intrinsic.import_index()));
            Ok(())
        }
    }
}
