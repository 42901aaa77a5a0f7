//! Coocoo compiler and image runtime as a WASM module for browsers.
//!
//! The browser compiles a script, instantiates the returned module with the
//! [`Library`] intrinsics as its `env` imports, runs `main`, then hands the
//! module's memory back to [`Library::collect`].
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { intrinsic_table, Library } from 'coocoo-wasm';
//!
//! await init();
//!
//! const library = new Library();
//! library.add_image("sky", 2, 2, pixels);
//! const result = library.compile("out = darken(sky, 10);\n(mat1, albedo, PBRMetalness) = out;");
//! // or: code_to_wasm(source, library.inputs())
//! const names = JSON.parse(intrinsic_table()).intrinsics.map(i => i.name);
//! const env = Object.fromEntries(names.map(n => [n, library[n].bind(library)]));
//! const { instance } = await WebAssembly.instantiate(new Uint8Array(result.module.wasm), { env });
//! instance.exports.main();
//! const images = library.collect(result.module, new Uint8Array(instance.exports.memory.buffer));
//! // { mat1: { albedo: { width: 2, height: 2, pixels: [...] } } }
//! ```

use std::collections::BTreeMap;

use coocoo_runtime::{ImageStore, RuntimeError};
use coocoo_types::{CompiledModule, Handle, InputImage, Intrinsic};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a script against `[{ name, handle }]` inputs, as returned by
/// [`Library::inputs`].
///
/// Returns a `CompileResult`: `{ success, module?, errors }`, where `module`
/// carries `wasm`, `material_slots`, `texture_slots` and `wasm_sha256`.
#[wasm_bindgen]
pub fn code_to_wasm(source: &str, inputs: JsValue) -> Result<JsValue, JsValue> {
    let inputs: Vec<InputImage> = serde_wasm_bindgen::from_value(inputs)?;
    to_js(&compile_result(source, &inputs))
}

/// Report diagnostics for `[{ name, handle }]` inputs without generating a
/// module, as a JSON string.
///
/// Cheaper than [`code_to_wasm`] for editor integration.
#[wasm_bindgen]
pub fn check(source: &str, filename: &str, inputs: JsValue) -> Result<String, JsValue> {
    let inputs: Vec<InputImage> = serde_wasm_bindgen::from_value(inputs)?;
    Ok(check_json(source, filename, &inputs))
}

fn compile_result(source: &str, inputs: &[InputImage]) -> coocoo_compiler::CompileResult {
    coocoo_compiler::compile_to_result(source, coocoo_compiler::DEFAULT_FILE_NAME, inputs)
}

fn check_json(source: &str, filename: &str, inputs: &[InputImage]) -> String {
    let errors = coocoo_compiler::check(source, filename, inputs);
    serde_json::to_string(&errors).unwrap_or_else(|e| {
        format!(
            r#"{{"errors":[{{"message":"Serialization error: {e}"}}],"warnings":[],"total_errors":1,"total_warnings":0}}"#
        )
    })
}

/// The compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Markdown reference of the language, its intrinsics and material types.
#[wasm_bindgen]
pub fn reference() -> String {
    coocoo_compiler::generate_reference()
}

/// JSON table of every intrinsic, for tooling.
#[wasm_bindgen]
pub fn intrinsic_table() -> String {
    coocoo_compiler::generate_intrinsic_table()
}

// ══════════════════════════════════════════════════════════════════════════════
// Library
// ══════════════════════════════════════════════════════════════════════════════

/// The image store plus the intrinsic imports of compiled modules.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct Library {
    store: ImageStore,
}

#[wasm_bindgen]
impl Library {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Library {
        Library::default()
    }

    /// Register an RGBA8 input image and return its handle.
    pub fn add_image(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<u32, JsError> {
        let handle = self
            .store
            .add_image(name, width, height, pixels)
            .map_err(js_error)?;
        Ok(handle.0)
    }

    /// Compile a script against this library's inputs and their current
    /// handles. Returns a `CompileResult` like [`code_to_wasm`].
    pub fn compile(&self, source: &str) -> Result<JsValue, JsValue> {
        to_js(&compile_result(source, &self.store.inputs()))
    }

    /// Diagnostics against this library's inputs, as a JSON string.
    pub fn check(&self, source: &str, filename: &str) -> String {
        check_json(source, filename, &self.store.inputs())
    }

    /// Drop every image and restart handles at 0.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Drop intrinsic results, keeping the inputs.
    pub fn clear_generated(&mut self) {
        self.store.clear_generated();
    }

    pub fn input_names(&self) -> Vec<String> {
        self.store
            .input_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// `[{ name, handle }]` in registration order.
    pub fn inputs(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.inputs())
    }

    pub fn contains_input(&self, name: &str) -> bool {
        self.store.contains_input(name)
    }

    pub fn rename_input(&mut self, old: &str, new: &str) -> Result<(), JsError> {
        self.store.rename_input(old, new).map_err(js_error)
    }

    /// Returns whether an input was removed.
    pub fn remove_input(&mut self, name: &str) -> bool {
        self.store.remove_input(name).is_some()
    }

    /// Snapshot images by handle: `{ name: handle }` → `{ name: image }`.
    /// Unknown handles are left out.
    pub fn export(&self, names: JsValue) -> Result<JsValue, JsValue> {
        let requested: BTreeMap<String, u32> = serde_wasm_bindgen::from_value(names)?;
        let images = coocoo_runtime::export(
            &self.store,
            requested
                .iter()
                .map(|(name, handle)| (name.as_str(), Handle(*handle))),
        );
        to_js(&images)
    }

    /// Read the slots of a finished run and export every written output.
    pub fn collect(&self, module: JsValue, memory: &[u8]) -> Result<JsValue, JsValue> {
        let module: CompiledModule = serde_wasm_bindgen::from_value(module)?;
        let images = coocoo_runtime::collect(&self.store, &module, memory);
        to_js(&images)
    }

    // ── Intrinsic imports ───────────────────────────────────────────────────

    pub fn resize(&mut self, image: i32, new_width: i32, new_height: i32) -> i32 {
        self.call(Intrinsic::Resize, &[image, new_width, new_height])
    }

    pub fn darken(&mut self, image: i32, value: i32) -> i32 {
        self.call(Intrinsic::Darken, &[image, value])
    }

    pub fn blank_image(&mut self, r: i32, g: i32, b: i32, a: i32, width: i32, height: i32) -> i32 {
        self.call(Intrinsic::BlankImage, &[r, g, b, a, width, height])
    }

    pub fn grayscale(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::Grayscale, &[image])
    }

    pub fn invert_color(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::InvertColor, &[image])
    }

    pub fn flip_horizontal(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::FlipHorizontal, &[image])
    }

    pub fn flip_vertical(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::FlipVertical, &[image])
    }

    pub fn mask_channel_r(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::MaskChannelR, &[image])
    }

    pub fn mask_channel_g(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::MaskChannelG, &[image])
    }

    pub fn mask_channel_b(&mut self, image: i32) -> i32 {
        self.call(Intrinsic::MaskChannelB, &[image])
    }
}

impl Library {
    fn call(&mut self, intrinsic: Intrinsic, args: &[i32]) -> i32 {
        coocoo_runtime::dispatch(&mut self.store, intrinsic, args)
    }
}

/// Maps become plain objects rather than ES `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn js_error(error: RuntimeError) -> JsError {
    JsError::new(&error.to_string())
}
