//! Main WASM module assembler.
//!
//! Orchestrates the code generation pipeline:
//! 1. Lay out one output slot per material channel and texture export
//! 2. Emit the intrinsic imports and the `main` body
//! 3. Assemble all WASM sections into a valid module
//! 4. Validate with `wasmparser` and fingerprint with SHA-256

use std::borrow::Cow;

use coocoo_types::ir::ResolvedProgram;
use coocoo_types::{CompiledModule, Handle, Intrinsic, MaterialSlot, TextureSlot, IMPORT_MODULE};
use sha2::{Digest, Sha256};
use wasm_encoder::{
    CodeSection, ConstExpr, CustomSection, DataSection, EntityType, ExportKind, ExportSection,
    Function, FunctionSection, ImportSection, Instruction, MemorySection, MemoryType, Module,
    TypeSection, ValType,
};

use crate::error::{CodegenError, CodegenResult};
use crate::stmt::{emit_binding, emit_slot_store};
use crate::types::*;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a resolved program into a `.wasm` module plus its slot layout.
///
/// The output is a pure function of the program: identical input yields
/// identical bytes.
pub fn compile(program: &ResolvedProgram) -> CodegenResult<CompiledModule> {
    Compiler::new(program)?.compile()
}

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

/// Per-function state shared with the body emitters.
pub struct FuncContext {
    /// Number of i32 locals; one per binding.
    pub local_count: u32,
}

struct Compiler<'a> {
    program: &'a ResolvedProgram,
    material_slots: Vec<MaterialSlot>,
    texture_slots: Vec<TextureSlot>,
}

impl<'a> Compiler<'a> {
    fn new(program: &'a ResolvedProgram) -> CodegenResult<Self> {
        let slot_count = program.channels.len() + program.textures.len();
        if slot_count > MAX_SLOTS {
            return Err(CodegenError::LimitExceeded(format!(
                "{slot_count} output slots, at most {MAX_SLOTS} fit in linear memory"
            )));
        }
        if u32::try_from(program.bindings.len()).is_err() {
            return Err(CodegenError::LimitExceeded(format!(
                "{} bindings",
                program.bindings.len()
            )));
        }

        let mut offsets = (0..).map(|i: u32| SLOT_BASE + i * SLOT_SIZE);
        let material_slots = program
            .channels
            .iter()
            .zip(offsets.by_ref())
            .map(|(ch, offset)| MaterialSlot {
                offset,
                material: ch.material.clone(),
                channel: ch.channel.clone(),
                material_type: ch.material_type.clone(),
            })
            .collect();
        let texture_slots = program
            .textures
            .iter()
            .zip(offsets)
            .map(|(tex, offset)| TextureSlot {
                offset,
                name: tex.name.clone(),
            })
            .collect();

        Ok(Self {
            program,
            material_slots,
            texture_slots,
        })
    }

    fn slot_count(&self) -> usize {
        self.material_slots.len() + self.texture_slots.len()
    }

    /// Run the full compilation pipeline.
    fn compile(self) -> CodegenResult<CompiledModule> {
        let mut module = Module::new();

        // 1. Type section
        module.section(&self.emit_types());

        // 2. Import section
        module.section(&self.emit_imports()?);

        // 3. Function section
        let mut functions = FunctionSection::new();
        functions.function(TYPE_VOID_VOID);
        module.section(&functions);

        // 4. Memory section
        module.section(&self.emit_memory());

        // 5. Export section
        module.section(&self.emit_exports());

        // 6. Code section
        let mut code = CodeSection::new();
        code.function(&self.emit_main()?);
        module.section(&code);

        // 7. Data section (slot initialisers)
        if self.slot_count() > 0 {
            module.section(&self.emit_data());
        }

        // 8. Custom section (Coocoo metadata)
        module.section(&self.emit_custom());

        let wasm = module.finish();

        // 9. Validate
        wasmparser::validate(&wasm).map_err(|e| CodegenError::ValidationFailed(format!("{e}")))?;

        let wasm_sha256 = format!("{:x}", Sha256::digest(&wasm));
        tracing::debug!(
            bytes = wasm.len(),
            material_slots = self.material_slots.len(),
            texture_slots = self.texture_slots.len(),
            "assembled module"
        );

        Ok(CompiledModule {
            wasm,
            material_slots: self.material_slots,
            texture_slots: self.texture_slots,
            wasm_sha256,
        })
    }

    // ── Type section ─────────────────────────────────────────────────────

    fn emit_types(&self) -> TypeSection {
        let mut types = TypeSection::new();

        // TYPE_VOID_VOID: () -> ()
        types.ty().function(vec![], vec![]);
        // TYPE_I32_I32 .. TYPE_I32X6_I32
        for arity in INTRINSIC_ARITIES {
            types
                .ty()
                .function(vec![ValType::I32; arity], vec![ValType::I32]);
        }

        types
    }

    // ── Import section ───────────────────────────────────────────────────

    /// Imports the whole catalogue, used or not, so hosts link one fixed set.
    fn emit_imports(&self) -> CodegenResult<ImportSection> {
        let mut imports = ImportSection::new();
        for intrinsic in Intrinsic::ALL {
            imports.import(
                IMPORT_MODULE,
                intrinsic.name(),
                EntityType::Function(intrinsic_type(intrinsic)?),
            );
        }
        Ok(imports)
    }

    // ── Memory section ───────────────────────────────────────────────────

    fn emit_memory(&self) -> MemorySection {
        let mut memory = MemorySection::new();
        memory.memory(MemoryType {
            minimum: pages_for_slots(self.slot_count()),
            maximum: Some(MAX_MEMORY_PAGES),
            memory64: false,
            shared: false,
            page_size_log2: None,
        });
        memory
    }

    // ── Export section ───────────────────────────────────────────────────

    fn emit_exports(&self) -> ExportSection {
        let mut exports = ExportSection::new();
        exports.export(ENTRY_EXPORT, ExportKind::Func, MAIN_FUNC_INDEX);
        exports.export(MEMORY_EXPORT, ExportKind::Memory, 0);
        exports
    }

    // ── Code section ─────────────────────────────────────────────────────

    /// `main`: evaluate every binding in program order, then fill the slots.
    fn emit_main(&self) -> CodegenResult<Function> {
        let ctx = FuncContext {
            local_count: self.program.bindings.len() as u32,
        };
        let locals = if ctx.local_count > 0 {
            vec![(ctx.local_count, ValType::I32)]
        } else {
            vec![]
        };
        let mut f = Function::new(locals);

        for (index, binding) in self.program.bindings.iter().enumerate() {
            emit_binding(index as u32, binding, &ctx, &mut f)?;
        }
        for (slot, channel) in self.material_slots.iter().zip(&self.program.channels) {
            emit_slot_store(slot.offset, &channel.source, &ctx, &mut f)?;
        }
        for (slot, texture) in self.texture_slots.iter().zip(&self.program.textures) {
            emit_slot_store(slot.offset, &texture.source, &ctx, &mut f)?;
        }

        f.instruction(&Instruction::End);
        Ok(f)
    }

    // ── Data section ─────────────────────────────────────────────────────

    fn emit_data(&self) -> DataSection {
        let mut data_sec = DataSection::new();
        let unset = Handle::UNSET.to_wire().to_le_bytes();
        let bytes: Vec<u8> = unset
            .iter()
            .copied()
            .cycle()
            .take(self.slot_count() * SLOT_SIZE as usize)
            .collect();
        data_sec.active(0, &ConstExpr::i32_const(SLOT_BASE as i32), bytes);
        data_sec
    }

    // ── Custom section ───────────────────────────────────────────────────

    fn emit_custom(&self) -> CustomSection<'static> {
        CustomSection {
            name: Cow::Borrowed(CUSTOM_SECTION_NAME),
            data: Cow::Borrowed(COMPILER_VERSION.as_bytes()),
        }
    }
}
