//! Body code generation for `main`: bindings and slot stores.

use coocoo_types::ir::{Binding, Operand};
use wasm_encoder::{Function, Instruction, MemArg};

use crate::compiler::FuncContext;
use crate::error::CodegenResult;
use crate::expr::{emit_operand, emit_value};

/// Evaluate a binding into its local.
pub fn emit_binding(
    index: u32,
    binding: &Binding,
    ctx: &FuncContext,
    f: &mut Function,
) -> CodegenResult<()> {
    emit_value(&binding.value, ctx, f)?;
    f.instruction(&Instruction::LocalSet(index));
    Ok(())
}

/// Store an operand's handle into the slot at `offset`.
pub fn emit_slot_store(
    offset: u32,
    source: &Operand,
    ctx: &FuncContext,
    f: &mut Function,
) -> CodegenResult<()> {
    f.instruction(&Instruction::I32Const(offset as i32));
    emit_operand(source, ctx, f)?;
    f.instruction(&Instruction::I32Store(MemArg {
        offset: 0,
        align: 2,
        memory_index: 0,
    }));
    Ok(())
}
