//! Handles and compiled-module metadata shared by codegen and the runtime.

use crate::MaterialType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an image inside an image store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u32);

impl Handle {
    /// Wire value meaning "no image". Written into every slot before `main` runs
    /// and returned by intrinsics that fail.
    pub const UNSET: Handle = Handle(2_147_483_647);

    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }

    /// Decode an i32 crossing the module boundary.
    pub fn from_wire(raw: i32) -> Option<Handle> {
        if raw < 0 || raw == Self::UNSET.0 as i32 {
            None
        } else {
            Some(Handle(raw as u32))
        }
    }

    pub fn to_wire(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An input image known to the compiler: the name scripts use and the handle
/// the store assigned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputImage {
    pub name: String,
    pub handle: Handle,
}

impl InputImage {
    pub fn new(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }
}

/// Where `main` leaves the final handle of one material channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSlot {
    pub offset: u32,
    pub material: String,
    pub channel: String,
    pub material_type: MaterialType,
}

/// Where `main` leaves the handle of one exported texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSlot {
    pub offset: u32,
    pub name: String,
}

/// A compiled script. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModule {
    pub wasm: Vec<u8>,
    pub material_slots: Vec<MaterialSlot>,
    pub texture_slots: Vec<TextureSlot>,
    /// Hex-encoded SHA-256 of `wasm`.
    pub wasm_sha256: String,
}
