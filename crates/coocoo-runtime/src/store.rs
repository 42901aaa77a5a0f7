//! Image Store: owns every raster image of a run, keyed by [`Handle`].
//!
//! Handles are handed out from a counter starting at 0 and are never reused
//! until [`ImageStore::reset`]. Input images additionally carry a name so
//! scripts can refer to them.

use std::collections::HashMap;

use coocoo_types::{Handle, InputImage};
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

// ══════════════════════════════════════════════════════════════════════════════
// ImageData
// ══════════════════════════════════════════════════════════════════════════════

/// A fixed-size RGBA8 raster, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Wrap caller-supplied pixels after checking their length.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> RuntimeResult<Self> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(RuntimeError::PixelLengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let at = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ]
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration
// ══════════════════════════════════════════════════════════════════════════════

/// Limits enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest accepted width or height.
    pub max_dimension: u32,
    /// Largest number of images held at once.
    pub max_images: usize,
    /// Largest total size of all pixel buffers, in bytes.
    pub max_total_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_dimension: 8192,
            max_images: 4096,
            max_total_bytes: 1 << 30,
        }
    }
}

impl StoreConfig {
    /// Check a requested size against the limits.
    pub fn dimensions(&self, width: i64, height: i64) -> RuntimeResult<(u32, u32)> {
        let max = i64::from(self.max_dimension);
        if !(1..=max).contains(&width) || !(1..=max).contains(&height) {
            return Err(RuntimeError::InvalidDimension {
                width,
                height,
                max: self.max_dimension,
            });
        }
        Ok((width as u32, height as u32))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ImageStore
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct ImageStore {
    config: StoreConfig,
    images: HashMap<Handle, ImageData>,
    /// Input names in registration order.
    inputs: Vec<(String, Handle)>,
    next: u32,
    /// Sum of every stored pixel buffer's length.
    total_bytes: usize,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Register a named input image.
    ///
    /// An existing input with the same name is replaced in place and keeps
    /// its handle.
    pub fn add_image(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> RuntimeResult<Handle> {
        self.config.dimensions(width.into(), height.into())?;
        let image = ImageData::from_rgba(width, height, pixels)?;

        if let Some(handle) = self.input_handle(name) {
            let freed = self.images.get(&handle).map_or(0, |old| old.pixels.len());
            self.check_bytes(image.pixels.len(), freed)?;
            self.total_bytes = self.total_bytes - freed + image.pixels.len();
            self.images.insert(handle, image);
            tracing::debug!(name, %handle, width, height, "input image replaced");
            return Ok(handle);
        }

        let handle = self.insert(image)?;
        self.inputs.push((name.to_string(), handle));
        tracing::debug!(name, %handle, width, height, "input image added");
        Ok(handle)
    }

    /// Store an anonymous image, usually an intrinsic result.
    ///
    /// The image is checked against the dimension, count and byte limits.
    pub fn insert(&mut self, image: ImageData) -> RuntimeResult<Handle> {
        self.config
            .dimensions(image.width.into(), image.height.into())?;
        let expected = byte_len(image.width, image.height);
        if image.pixels.len() != expected {
            return Err(RuntimeError::PixelLengthMismatch {
                expected,
                actual: image.pixels.len(),
            });
        }
        self.check_bytes(expected, 0)?;
        if self.images.len() >= self.config.max_images {
            return Err(RuntimeError::HandleSpaceExhausted {
                max: self.config.max_images,
            });
        }
        let handle = Handle(self.next);
        if handle.is_unset() {
            return Err(RuntimeError::HandleSpaceExhausted {
                max: self.config.max_images,
            });
        }
        self.next += 1;
        self.total_bytes += image.pixels.len();
        self.images.insert(handle, image);
        Ok(handle)
    }

    /// Check that a `width × height` image would fit before its pixels are
    /// allocated.
    pub fn ensure_room(&self, width: u32, height: u32) -> RuntimeResult<()> {
        self.check_bytes(byte_len(width, height), 0)
    }

    /// Bytes held by all pixel buffers.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn check_bytes(&self, requested: usize, freed: usize) -> RuntimeResult<()> {
        let limit = self.config.max_total_bytes;
        let fits = (self.total_bytes - freed)
            .checked_add(requested)
            .is_some_and(|total| total <= limit);
        if !fits {
            return Err(RuntimeError::ByteLimitExceeded { requested, limit });
        }
        Ok(())
    }

    pub fn get(&self, handle: Handle) -> RuntimeResult<&ImageData> {
        self.images
            .get(&handle)
            .ok_or(RuntimeError::UnknownHandle(handle))
    }

    /// Drop every image and input name, and restart handles at 0.
    pub fn reset(&mut self) {
        tracing::debug!(images = self.images.len(), "image store reset");
        self.images.clear();
        self.inputs.clear();
        self.next = 0;
        self.total_bytes = 0;
    }

    /// Drop intrinsic results but keep the inputs and their handles.
    ///
    /// Handles of dropped results are not reused.
    pub fn clear_generated(&mut self) {
        let inputs: Vec<Handle> = self.inputs.iter().map(|(_, h)| *h).collect();
        self.images.retain(|handle, _| inputs.contains(handle));
        self.total_bytes = self.images.values().map(|image| image.pixels.len()).sum();
    }

    // ── Input names ─────────────────────────────────────────────────────────

    /// `(name, handle)` of every input, in registration order.
    pub fn inputs(&self) -> Vec<InputImage> {
        self.inputs
            .iter()
            .map(|(name, handle)| InputImage::new(name.as_str(), *handle))
            .collect()
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn input_handle(&self, name: &str) -> Option<Handle> {
        self.inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handle)| *handle)
    }

    pub fn contains_input(&self, name: &str) -> bool {
        self.input_handle(name).is_some()
    }

    /// Give an input a new name. The handle is unchanged.
    pub fn rename_input(&mut self, old: &str, new: &str) -> RuntimeResult<()> {
        if old == new {
            return Ok(());
        }
        if self.contains_input(new) {
            return Err(RuntimeError::NameTaken(new.to_string()));
        }
        let entry = self
            .inputs
            .iter_mut()
            .find(|(n, _)| n == old)
            .ok_or_else(|| RuntimeError::UnknownInput(old.to_string()))?;
        entry.0 = new.to_string();
        Ok(())
    }

    /// Remove an input and its image.
    pub fn remove_input(&mut self, name: &str) -> Option<ImageData> {
        let position = self.inputs.iter().position(|(n, _)| n == name)?;
        let (_, handle) = self.inputs.remove(position);
        let image = self.images.remove(&handle)?;
        self.total_bytes -= image.pixels.len();
        Some(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> Vec<u8> {
        vec![255; width as usize * height as usize * CHANNELS]
    }

    #[test]
    fn handles_count_up_from_zero() {
        let mut store = ImageStore::new();
        assert_eq!(store.add_image("a", 1, 1, white(1, 1)).unwrap(), Handle(0));
        assert_eq!(store.add_image("b", 2, 1, white(2, 1)).unwrap(), Handle(1));
        assert_eq!(store.insert(ImageData::filled(1, 1, [0; 4])).unwrap(), Handle(2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn pixel_length_is_checked() {
        let mut store = ImageStore::new();
        let err = store.add_image("a", 2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::PixelLengthMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn dimensions_are_checked() {
        let mut store = ImageStore::with_config(StoreConfig {
            max_dimension: 4,
            ..StoreConfig::default()
        });
        assert!(matches!(
            store.add_image("a", 0, 1, vec![]),
            Err(RuntimeError::InvalidDimension { .. })
        ));
        assert!(matches!(
            store.add_image("a", 5, 1, white(5, 1)),
            Err(RuntimeError::InvalidDimension { max: 4, .. })
        ));
    }

    #[test]
    fn same_name_replaces_and_keeps_handle() {
        let mut store = ImageStore::new();
        let first = store.add_image("sky", 1, 1, white(1, 1)).unwrap();
        let second = store.add_image("sky", 2, 2, vec![7; 16]).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(first).unwrap().width, 2);
        assert_eq!(store.input_names(), vec!["sky"]);
    }

    #[test]
    fn reset_restarts_handles() {
        let mut store = ImageStore::new();
        store.add_image("a", 1, 1, white(1, 1)).unwrap();
        store.add_image("b", 1, 1, white(1, 1)).unwrap();
        store.reset();
        assert!(store.is_empty());
        assert!(store.inputs().is_empty());
        assert_eq!(store.add_image("b", 1, 1, white(1, 1)).unwrap(), Handle(0));
    }

    #[test]
    fn full_store_is_rejected() {
        let mut store = ImageStore::with_config(StoreConfig {
            max_images: 2,
            ..StoreConfig::default()
        });
        store.insert(ImageData::filled(1, 1, [0; 4])).unwrap();
        store.insert(ImageData::filled(1, 1, [0; 4])).unwrap();
        assert_eq!(
            store.insert(ImageData::filled(1, 1, [0; 4])),
            Err(RuntimeError::HandleSpaceExhausted { max: 2 })
        );
    }

    #[test]
    fn inputs_keep_registration_order() {
        let mut store = ImageStore::new();
        store.add_image("zeta", 1, 1, white(1, 1)).unwrap();
        store.add_image("alpha", 1, 1, white(1, 1)).unwrap();
        let inputs = store.inputs();
        assert_eq!(inputs[0], InputImage::new("zeta", Handle(0)));
        assert_eq!(inputs[1], InputImage::new("alpha", Handle(1)));
    }

    #[test]
    fn rename_refuses_taken_names() {
        let mut store = ImageStore::new();
        store.add_image("a", 1, 1, white(1, 1)).unwrap();
        store.add_image("b", 1, 1, white(1, 1)).unwrap();
        assert_eq!(
            store.rename_input("a", "b"),
            Err(RuntimeError::NameTaken("b".into()))
        );
        assert_eq!(
            store.rename_input("missing", "c"),
            Err(RuntimeError::UnknownInput("missing".into()))
        );
        store.rename_input("a", "c").unwrap();
        assert_eq!(store.input_handle("c"), Some(Handle(0)));
        assert!(!store.contains_input("a"));
    }

    #[test]
    fn remove_input_drops_the_image() {
        let mut store = ImageStore::new();
        let handle = store.add_image("a", 1, 1, white(1, 1)).unwrap();
        assert!(store.remove_input("a").is_some());
        assert!(store.remove_input("a").is_none());
        assert_eq!(store.get(handle), Err(RuntimeError::UnknownHandle(handle)));
    }

    #[test]
    fn clear_generated_keeps_inputs() {
        let mut store = ImageStore::new();
        let input = store.add_image("a", 1, 1, white(1, 1)).unwrap();
        let generated = store.insert(ImageData::filled(1, 1, [1; 4])).unwrap();
        store.clear_generated();
        assert!(store.get(input).is_ok());
        assert!(store.get(generated).is_err());
        assert_eq!(store.insert(ImageData::filled(1, 1, [1; 4])).unwrap(), Handle(2));
    }

    #[test]
    fn byte_budget_is_enforced() {
        let mut store = ImageStore::with_config(StoreConfig {
            max_total_bytes: 40,
            ..StoreConfig::default()
        });
        store.add_image("a", 2, 2, white(2, 2)).unwrap();
        assert_eq!(store.total_bytes(), 16);
        store.insert(ImageData::filled(2, 2, [0; 4])).unwrap();
        assert_eq!(
            store.ensure_room(2, 2),
            Err(RuntimeError::ByteLimitExceeded {
                requested: 16,
                limit: 40
            })
        );
        assert!(matches!(
            store.insert(ImageData::filled(2, 2, [0; 4])),
            Err(RuntimeError::ByteLimitExceeded { .. })
        ));
        assert_eq!(store.len(), 2);

        store.clear_generated();
        assert_eq!(store.total_bytes(), 16);
        assert!(store.ensure_room(2, 2).is_ok());
        store.remove_input("a");
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn replacing_an_input_counts_the_difference() {
        let mut store = ImageStore::with_config(StoreConfig {
            max_total_bytes: 20,
            ..StoreConfig::default()
        });
        store.add_image("a", 2, 2, white(2, 2)).unwrap();
        store.add_image("a", 1, 1, white(1, 1)).unwrap();
        assert_eq!(store.total_bytes(), 4);
        assert!(store.add_image("a", 3, 2, white(3, 2)).is_err());
        assert_eq!(store.get(Handle(0)).unwrap().width, 1);
    }

    #[test]
    fn insert_rejects_malformed_images() {
        let mut store = ImageStore::new();
        let empty = ImageData {
            width: 0,
            height: 3,
            pixels: Vec::new(),
        };
        assert!(matches!(
            store.insert(empty),
            Err(RuntimeError::InvalidDimension { width: 0, .. })
        ));
        let short = ImageData {
            width: 2,
            height: 2,
            pixels: vec![0; 12],
        };
        assert_eq!(
            store.insert(short),
            Err(RuntimeError::PixelLengthMismatch {
                expected: 16,
                actual: 12
            })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn config_deserialises_with_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{ "max_images": 8 }"#).unwrap();
        assert_eq!(config.max_images, 8);
        assert_eq!(config.max_dimension, 8192);
        assert_eq!(config.max_total_bytes, 1 << 30);
    }

    #[test]
    fn filled_repeats_the_colour() {
        let image = ImageData::filled(2, 1, [1, 2, 3, 4]);
        assert_eq!(image.pixels, vec![1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(image.pixel(1, 0), [1, 2, 3, 4]);
    }
}
