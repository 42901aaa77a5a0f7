//! Export Protocol: turns what a finished run left behind into named images.
//!
//! Texture slots are grouped under [`TEXTURES`]; material slots under their
//! material instance name, keyed by channel. A slot still holding
//! [`Handle::UNSET`] was never written and is silently left out.

use std::collections::BTreeMap;

use coocoo_types::{CompiledModule, Handle};

use crate::store::{ImageData, ImageStore};

/// Category of texture-style outputs.
pub const TEXTURES: &str = "textures";

/// `category -> name -> image`.
pub type ExportedImages = BTreeMap<String, BTreeMap<String, ImageData>>;

/// Snapshot the requested images. Names whose handle is not in the store are
/// omitted.
pub fn export<'a>(
    store: &ImageStore,
    requested: impl IntoIterator<Item = (&'a str, Handle)>,
) -> BTreeMap<String, ImageData> {
    requested
        .into_iter()
        .filter_map(|(name, handle)| {
            let image = store.get(handle).ok()?;
            Some((name.to_string(), image.clone()))
        })
        .collect()
}

/// Read the little-endian handle at `offset`. The sentinel, negative values
/// and out-of-range offsets all read as `None`.
pub fn read_slot(memory: &[u8], offset: u32) -> Option<Handle> {
    let start = offset as usize;
    let bytes = memory.get(start..start.checked_add(4)?)?;
    let raw = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    Handle::from_wire(raw)
}

/// Read every slot of `module` from its linear memory and export the images.
pub fn collect(store: &ImageStore, module: &CompiledModule, memory: &[u8]) -> ExportedImages {
    let mut exported = ExportedImages::new();

    let textures = export(
        store,
        module
            .texture_slots
            .iter()
            .filter_map(|slot| Some((slot.name.as_str(), read_slot(memory, slot.offset)?))),
    );
    if !textures.is_empty() {
        exported.insert(TEXTURES.to_string(), textures);
    }

    for slot in &module.material_slots {
        let Some(image) = read_slot(memory, slot.offset).and_then(|h| store.get(h).ok()) else {
            continue;
        };
        exported
            .entry(slot.material.clone())
            .or_default()
            .insert(slot.channel.clone(), image.clone());
    }

    tracing::debug!(
        categories = exported.len(),
        images = exported.values().map(BTreeMap::len).sum::<usize>(),
        "outputs collected"
    );
    exported
}

#[cfg(test)]
mod tests {
    use super::*;
    use coocoo_types::{MaterialSlot, MaterialType, TextureSlot};

    fn memory(slots: &[i32]) -> Vec<u8> {
        slots.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn store_with(count: usize) -> ImageStore {
        let mut store = ImageStore::new();
        for i in 0..count {
            store
                .insert(ImageData::filled(1, 1, [i as u8, 0, 0, 255]))
                .unwrap();
        }
        store
    }

    fn module(materials: &[(&str, &str)], textures: &[&str]) -> CompiledModule {
        let mut offset = 0;
        let mut next = || {
            offset += 4;
            offset - 4
        };
        let material_slots = materials
            .iter()
            .map(|(material, channel)| MaterialSlot {
                offset: next(),
                material: material.to_string(),
                channel: channel.to_string(),
                material_type: MaterialType::PbrMetalness,
            })
            .collect();
        let texture_slots = textures
            .iter()
            .map(|name| TextureSlot {
                offset: next(),
                name: name.to_string(),
            })
            .collect();
        CompiledModule {
            wasm: Vec::new(),
            material_slots,
            texture_slots,
            wasm_sha256: String::new(),
        }
    }

    #[test]
    fn read_slot_decodes_little_endian() {
        let mem = memory(&[3, 70_000]);
        assert_eq!(read_slot(&mem, 0), Some(Handle(3)));
        assert_eq!(read_slot(&mem, 4), Some(Handle(70_000)));
    }

    #[test]
    fn read_slot_rejects_sentinel_and_bounds() {
        let mem = memory(&[Handle::UNSET.to_wire(), -4]);
        assert_eq!(read_slot(&mem, 0), None);
        assert_eq!(read_slot(&mem, 4), None);
        assert_eq!(read_slot(&mem, 6), None);
        assert_eq!(read_slot(&mem, u32::MAX), None);
    }

    #[test]
    fn export_skips_unknown_handles() {
        let store = store_with(2);
        let out = export(&store, [("a", Handle(1)), ("b", Handle(9))]);
        assert_eq!(out.len(), 1);
        assert_eq!(out["a"].pixels[0], 1);
    }

    #[test]
    fn collect_groups_by_category() {
        let store = store_with(3);
        let module = module(&[("wall", "diffuse"), ("wall", "ao"), ("floor", "normal")], &["mask"]);
        let mem = memory(&[0, 1, 2, 0]);
        let out = collect(&store, &module, &mem);

        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            vec!["floor", "textures", "wall"]
        );
        assert_eq!(out["wall"]["diffuse"].pixels[0], 0);
        assert_eq!(out["wall"]["ao"].pixels[0], 1);
        assert_eq!(out["floor"]["normal"].pixels[0], 2);
        assert_eq!(out[TEXTURES]["mask"].pixels[0], 0);
    }

    #[test]
    fn unset_slots_are_absent() {
        let store = store_with(1);
        let module = module(&[("wall", "diffuse"), ("wall", "ao")], &["mask"]);
        let unset = Handle::UNSET.to_wire();
        let mem = memory(&[0, unset, unset]);
        let out = collect(&store, &module, &mem);

        assert_eq!(out.len(), 1);
        assert!(out["wall"].contains_key("diffuse"));
        assert!(!out["wall"].contains_key("ao"));
        assert!(!out.contains_key(TEXTURES));
    }

    #[test]
    fn exported_images_serialise_as_nested_maps() {
        let store = store_with(1);
        let module = module(&[("mat1", "albedo")], &[]);
        let out = collect(&store, &module, &memory(&[0]));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["mat1"]["albedo"]["width"], 1);
        assert_eq!(json["mat1"]["albedo"]["pixels"][3], 255);
    }
}
