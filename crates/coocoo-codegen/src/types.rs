//! Module layout constants shared by the assembler and its hosts.
//!
//! The linear memory holds nothing but output slots:
//!
//! ```text
//! SLOT_BASE + 0            : i32 handle of material slot 0
//! SLOT_BASE + 4            : i32 handle of material slot 1
//! ...
//! SLOT_BASE + 4*m          : i32 handle of texture slot 0
//! ...
//! ```
//!
//! Every slot starts as [`coocoo_types::Handle::UNSET`] and is overwritten
//! by `main`.

use coocoo_types::Intrinsic;

use crate::error::{CodegenError, CodegenResult};

// ── Type section ─────────────────────────────────────────────────────────────
// (order must match `emit_types` in compiler.rs)

/// `() -> ()`, the entry point.
pub const TYPE_VOID_VOID: u32 = 0;
/// `(i32) -> i32`
pub const TYPE_I32_I32: u32 = 1;
/// `(i32, i32) -> i32`
pub const TYPE_I32X2_I32: u32 = 2;
/// `(i32, i32, i32) -> i32`
pub const TYPE_I32X3_I32: u32 = 3;
/// `(i32 × 6) -> i32`
pub const TYPE_I32X6_I32: u32 = 4;

/// Parameter counts of the intrinsic signatures, in type-index order.
pub const INTRINSIC_ARITIES: [usize; 4] = [1, 2, 3, 6];

/// Type index of an intrinsic. Types are shared between intrinsics of the
/// same arity.
pub fn intrinsic_type(intrinsic: Intrinsic) -> CodegenResult<u32> {
    match intrinsic.arity() {
        1 => Ok(TYPE_I32_I32),
        2 => Ok(TYPE_I32X2_I32),
        3 => Ok(TYPE_I32X3_I32),
        6 => Ok(TYPE_I32X6_I32),
        n => Err(CodegenError::Internal(format!(
            "no function type for {intrinsic} with {n} parameters"
        ))),
    }
}

// ── Functions ────────────────────────────────────────────────────────────────

/// Every intrinsic is imported, so imports occupy indices `0..IMPORT_COUNT`.
pub const IMPORT_COUNT: u32 = Intrinsic::ALL.len() as u32;
/// Function index of `main`.
pub const MAIN_FUNC_INDEX: u32 = IMPORT_COUNT;

// ── Exports ──────────────────────────────────────────────────────────────────

pub const ENTRY_EXPORT: &str = "main";
pub const MEMORY_EXPORT: &str = "memory";

// ── Memory ───────────────────────────────────────────────────────────────────

/// Byte offset of the first slot.
pub const SLOT_BASE: u32 = 0;
/// Size of one slot: a little-endian i32 handle.
pub const SLOT_SIZE: u32 = 4;
pub const PAGE_SIZE: u32 = 65_536;
/// Maximum linear memory pages (1 MiB).
pub const MAX_MEMORY_PAGES: u64 = 16;
/// Largest number of slots that fits in [`MAX_MEMORY_PAGES`].
pub const MAX_SLOTS: usize = (MAX_MEMORY_PAGES as usize * PAGE_SIZE as usize) / SLOT_SIZE as usize;

/// Pages needed for `slot_count` slots (at least one).
pub fn pages_for_slots(slot_count: usize) -> u64 {
    let bytes = SLOT_BASE as u64 + slot_count as u64 * SLOT_SIZE as u64;
    bytes.div_ceil(PAGE_SIZE as u64).max(1)
}

// ── Custom section ───────────────────────────────────────────────────────────

/// Custom section name for Coocoo metadata.
pub const CUSTOM_SECTION_NAME: &str = "coocoo";
/// Compiler version embedded in the custom section.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");
