//! Intrinsic Library: the image operations a compiled module imports.
//!
//! Every operation reads its inputs from the [`ImageStore`] and stores its
//! result as a new image, so earlier handles stay valid (copy-on-write).
//! Room for the result is checked before its pixels are allocated.
//! Alpha is preserved unless stated otherwise.

use coocoo_types::{Handle, Intrinsic, ValueKind};

use crate::error::{RuntimeError, RuntimeResult};
use crate::store::{ImageData, ImageStore, CHANNELS};

// ══════════════════════════════════════════════════════════════════════════════
// Store-level operations
// ══════════════════════════════════════════════════════════════════════════════

/// Nearest-neighbour resample to `new_width × new_height`.
pub fn resize(
    store: &mut ImageStore,
    image: Handle,
    new_width: i32,
    new_height: i32,
) -> RuntimeResult<Handle> {
    let (width, height) = store
        .config()
        .dimensions(new_width.into(), new_height.into())?;
    store.ensure_room(width, height)?;
    let resized = resample(store.get(image)?, width, height);
    store.insert(resized)
}

/// Subtract `value` from R, G and B, clamping to `0..=255`. A negative value
/// brightens.
pub fn darken(store: &mut ImageStore, image: Handle, value: i32) -> RuntimeResult<Handle> {
    let value = i64::from(value);
    map_rgb(store, image, |c| (i64::from(c) - value).clamp(0, 255) as u8)
}

/// A `width × height` image filled with one colour. Channel values are
/// clamped to `0..=255`.
pub fn blank_image(
    store: &mut ImageStore,
    rgba: [i32; 4],
    width: i32,
    height: i32,
) -> RuntimeResult<Handle> {
    let (width, height) = store.config().dimensions(width.into(), height.into())?;
    store.ensure_room(width, height)?;
    let colour = rgba.map(|c| c.clamp(0, 255) as u8);
    store.insert(ImageData::filled(width, height, colour))
}

/// Luma with Rec. 601 weights, written to R, G and B.
pub fn grayscale(store: &mut ImageStore, image: Handle) -> RuntimeResult<Handle> {
    map_pixels(store, image, |px| {
        let luma = (299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2])
            + 500)
            / 1000;
        let luma = luma as u8;
        [luma, luma, luma, px[3]]
    })
}

pub fn invert_color(store: &mut ImageStore, image: Handle) -> RuntimeResult<Handle> {
    map_rgb(store, image, |c| 255 - c)
}

/// Mirror left to right.
pub fn flip_horizontal(store: &mut ImageStore, image: Handle) -> RuntimeResult<Handle> {
    let source = store.get(image)?;
    store.ensure_room(source.width, source.height)?;
    let width = source.width as usize;
    let mut pixels = Vec::with_capacity(source.pixels.len());
    for row in source.pixels.chunks_exact(width * CHANNELS) {
        for px in row.chunks_exact(CHANNELS).rev() {
            pixels.extend_from_slice(px);
        }
    }
    let flipped = ImageData {
        width: source.width,
        height: source.height,
        pixels,
    };
    store.insert(flipped)
}

/// Mirror top to bottom.
pub fn flip_vertical(store: &mut ImageStore, image: Handle) -> RuntimeResult<Handle> {
    let source = store.get(image)?;
    store.ensure_room(source.width, source.height)?;
    let row_len = source.width as usize * CHANNELS;
    let pixels = source
        .pixels
        .chunks_exact(row_len)
        .rev()
        .flatten()
        .copied()
        .collect();
    let flipped = ImageData {
        width: source.width,
        height: source.height,
        pixels,
    };
    store.insert(flipped)
}

/// Broadcast one colour channel into R, G and B, showing it as an opaque
/// grey image.
pub fn mask_channel(store: &mut ImageStore, image: Handle, channel: usize) -> RuntimeResult<Handle> {
    map_pixels(store, image, |px| {
        let v = px[channel];
        [v, v, v, 255]
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Dispatch
// ══════════════════════════════════════════════════════════════════════════════

/// Run `intrinsic` with raw module arguments.
pub fn call(store: &mut ImageStore, intrinsic: Intrinsic, args: &[i32]) -> RuntimeResult<Handle> {
    if args.len() != intrinsic.arity() {
        return Err(RuntimeError::Host(format!(
            "{intrinsic} takes {} arguments, got {}",
            intrinsic.arity(),
            args.len()
        )));
    }
    match intrinsic {
        Intrinsic::Resize => resize(store, handle_arg(args[0])?, args[1], args[2]),
        Intrinsic::Darken => darken(store, handle_arg(args[0])?, args[1]),
        Intrinsic::BlankImage => {
            blank_image(store, [args[0], args[1], args[2], args[3]], args[4], args[5])
        }
        Intrinsic::Grayscale => grayscale(store, handle_arg(args[0])?),
        Intrinsic::InvertColor => invert_color(store, handle_arg(args[0])?),
        Intrinsic::FlipHorizontal => flip_horizontal(store, handle_arg(args[0])?),
        Intrinsic::FlipVertical => flip_vertical(store, handle_arg(args[0])?),
        Intrinsic::MaskChannelR => mask_channel(store, handle_arg(args[0])?, 0),
        Intrinsic::MaskChannelG => mask_channel(store, handle_arg(args[0])?, 1),
        Intrinsic::MaskChannelB => mask_channel(store, handle_arg(args[0])?, 2),
    }
}

/// Run `intrinsic` and encode the result for the module.
///
/// Failures never trap: they yield [`Handle::UNSET`], which later
/// intrinsics pass through and the export protocol skips.
pub fn dispatch(store: &mut ImageStore, intrinsic: Intrinsic, args: &[i32]) -> i32 {
    if intrinsic.params().iter().zip(args).any(|((_, kind), raw)| {
        *kind == ValueKind::Image && *raw == Handle::UNSET.to_wire()
    }) {
        tracing::debug!(%intrinsic, "unset input, result is unset");
        return Handle::UNSET.to_wire();
    }
    match call(store, intrinsic, args) {
        Ok(handle) => handle.to_wire(),
        Err(error) => {
            tracing::warn!(%intrinsic, ?args, %error, "intrinsic failed, result is unset");
            Handle::UNSET.to_wire()
        }
    }
}

fn handle_arg(raw: i32) -> RuntimeResult<Handle> {
    Handle::from_wire(raw).ok_or(RuntimeError::UnknownHandle(Handle(raw as u32)))
}

// ══════════════════════════════════════════════════════════════════════════════
// Pixel helpers
// ══════════════════════════════════════════════════════════════════════════════

fn map_pixels(
    store: &mut ImageStore,
    image: Handle,
    f: impl Fn([u8; 4]) -> [u8; 4],
) -> RuntimeResult<Handle> {
    let source = store.get(image)?;
    store.ensure_room(source.width, source.height)?;
    let pixels = source
        .pixels
        .chunks_exact(CHANNELS)
        .flat_map(|px| f([px[0], px[1], px[2], px[3]]))
        .collect();
    let mapped = ImageData {
        width: source.width,
        height: source.height,
        pixels,
    };
    store.insert(mapped)
}

fn map_rgb(store: &mut ImageStore, image: Handle, f: impl Fn(u8) -> u8) -> RuntimeResult<Handle> {
    map_pixels(store, image, |[r, g, b, a]| [f(r), f(g), f(b), a])
}

fn resample(source: &ImageData, width: u32, height: u32) -> ImageData {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for y in 0..height {
        let sy = (u64::from(y) * u64::from(source.height) / u64::from(height)) as u32;
        for x in 0..width {
            let sx = (u64::from(x) * u64::from(source.width) / u64::from(width)) as u32;
            pixels.extend_from_slice(&source.pixel(sx, sy));
        }
    }
    ImageData {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2×2: red, green / blue, white, all opaque.
    fn quad(store: &mut ImageStore) -> Handle {
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        store.add_image("quad", 2, 2, pixels).unwrap()
    }

    fn pixels(store: &ImageStore, handle: Handle) -> Vec<u8> {
        store.get(handle).unwrap().pixels.clone()
    }

    #[test]
    fn darken_clamps_and_keeps_alpha() {
        let mut store = ImageStore::new();
        let src = store.add_image("a", 1, 1, vec![5, 100, 255, 128]).unwrap();
        let out = darken(&mut store, src, 10).unwrap();
        assert_eq!(pixels(&store, out), vec![0, 90, 245, 128]);
    }

    #[test]
    fn darken_by_zero_is_identity() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let out = darken(&mut store, src, 0).unwrap();
        assert_ne!(src, out);
        assert_eq!(pixels(&store, src), pixels(&store, out));
    }

    #[test]
    fn darken_never_brightens_for_positive_values() {
        let mut store = ImageStore::new();
        let src = store
            .add_image("a", 2, 1, vec![0, 1, 2, 3, 200, 201, 202, 203])
            .unwrap();
        for value in [1, 7, 100, 300, i32::MAX] {
            let out = darken(&mut store, src, value).unwrap();
            let before = pixels(&store, src);
            let after = pixels(&store, out);
            for (i, (b, a)) in before.iter().zip(&after).enumerate() {
                if i % 4 == 3 {
                    assert_eq!(a, b);
                } else {
                    assert!(a <= b);
                }
            }
        }
    }

    #[test]
    fn negative_darken_brightens() {
        let mut store = ImageStore::new();
        let src = store.add_image("a", 1, 1, vec![250, 0, 10, 9]).unwrap();
        let out = darken(&mut store, src, i32::MIN).unwrap();
        assert_eq!(pixels(&store, out), vec![255, 255, 255, 9]);
    }

    #[test]
    fn invert_is_an_involution() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let once = invert_color(&mut store, src).unwrap();
        let twice = invert_color(&mut store, once).unwrap();
        assert_eq!(pixels(&store, once)[0..4], [0, 255, 255, 255]);
        assert_eq!(pixels(&store, src), pixels(&store, twice));
    }

    #[test]
    fn flips_are_involutions() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let h = flip_horizontal(&mut store, src).unwrap();
        assert_eq!(store.get(h).unwrap().pixel(0, 0), [0, 255, 0, 255]);
        let hh = flip_horizontal(&mut store, h).unwrap();
        assert_eq!(pixels(&store, src), pixels(&store, hh));

        let v = flip_vertical(&mut store, src).unwrap();
        assert_eq!(store.get(v).unwrap().pixel(0, 0), [0, 0, 255, 255]);
        let vv = flip_vertical(&mut store, v).unwrap();
        assert_eq!(pixels(&store, src), pixels(&store, vv));
    }

    #[test]
    fn both_flips_rotate_half_a_turn() {
        let mut store = ImageStore::new();
        let (w, h) = (3u32, 2u32);
        let pixels = (0..w * h)
            .flat_map(|i| [i as u8 * 10, i as u8, 255 - i as u8, 255])
            .collect();
        let src = store.add_image("a", w, h, pixels).unwrap();
        let flipped = flip_horizontal(&mut store, src).unwrap();
        let rotated = flip_vertical(&mut store, flipped).unwrap();

        let source = store.get(src).unwrap();
        let result = store.get(rotated).unwrap();
        assert_eq!((result.width, result.height), (w, h));
        for y in 0..h {
            for x in 0..w {
                assert_eq!(
                    result.pixel(w - 1 - x, h - 1 - y),
                    source.pixel(x, y),
                    "pixel ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn large_results_fail_before_allocating() {
        let mut store = ImageStore::with_config(crate::store::StoreConfig {
            max_total_bytes: 64,
            ..Default::default()
        });
        let src = quad(&mut store);
        assert!(matches!(
            resize(&mut store, src, 8192, 8192),
            Err(RuntimeError::ByteLimitExceeded { requested: 268_435_456, limit: 64 })
        ));
        assert!(matches!(
            blank_image(&mut store, [0, 0, 0, 255], 8192, 8192),
            Err(RuntimeError::ByteLimitExceeded { .. })
        ));
        let unset = Handle::UNSET.to_wire();
        assert_eq!(
            dispatch(&mut store, Intrinsic::BlankImage, &[0, 0, 0, 255, 4096, 4096]),
            unset
        );
        assert_eq!(store.len(), 1);

        // 16 + 3 * 16 fills the budget exactly.
        for _ in 0..3 {
            invert_color(&mut store, src).unwrap();
        }
        assert!(matches!(
            grayscale(&mut store, src),
            Err(RuntimeError::ByteLimitExceeded { .. })
        ));
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let out = grayscale(&mut store, src).unwrap();
        let image = store.get(out).unwrap();
        assert_eq!(image.pixel(0, 0), [76, 76, 76, 255]);
        assert_eq!(image.pixel(1, 0), [150, 150, 150, 255]);
        assert_eq!(image.pixel(0, 1), [29, 29, 29, 255]);
        assert_eq!(image.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn mask_broadcasts_one_channel() {
        let mut store = ImageStore::new();
        let src = store.add_image("a", 1, 1, vec![10, 20, 30, 40]).unwrap();
        let r = mask_channel(&mut store, src, 0).unwrap();
        let g = mask_channel(&mut store, src, 1).unwrap();
        let b = mask_channel(&mut store, src, 2).unwrap();
        assert_eq!(pixels(&store, r), vec![10, 10, 10, 255]);
        assert_eq!(pixels(&store, g), vec![20, 20, 20, 255]);
        assert_eq!(pixels(&store, b), vec![30, 30, 30, 255]);
    }

    #[test]
    fn resize_nearest_neighbour() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let big = resize(&mut store, src, 4, 4).unwrap();
        let image = store.get(big).unwrap();
        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(image.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(image.pixel(2, 0), [0, 255, 0, 255]);
        assert_eq!(image.pixel(3, 3), [255, 255, 255, 255]);

        let small = resize(&mut store, src, 1, 1).unwrap();
        assert_eq!(pixels(&store, small), vec![255, 0, 0, 255]);
    }

    #[test]
    fn resize_rejects_bad_dimensions() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        assert!(matches!(
            resize(&mut store, src, 0, 4),
            Err(RuntimeError::InvalidDimension { width: 0, height: 4, .. })
        ));
        assert!(matches!(
            resize(&mut store, src, 4, -1),
            Err(RuntimeError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn blank_image_fills_and_clamps() {
        let mut store = ImageStore::new();
        let out = blank_image(&mut store, [300, -5, 128, 255], 2, 1).unwrap();
        assert_eq!(pixels(&store, out), vec![255, 0, 128, 255, 255, 0, 128, 255]);
    }

    #[test]
    fn every_result_is_a_new_handle() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let mut seen = vec![src];
        for intrinsic in Intrinsic::ALL {
            let args: Vec<i32> = match intrinsic {
                Intrinsic::Resize => vec![src.to_wire(), 3, 3],
                Intrinsic::Darken => vec![src.to_wire(), 1],
                Intrinsic::BlankImage => vec![1, 2, 3, 4, 2, 2],
                _ => vec![src.to_wire()],
            };
            let handle = call(&mut store, intrinsic, &args).unwrap();
            assert!(!seen.contains(&handle), "{intrinsic} reused a handle");
            seen.push(handle);
        }
        assert_eq!(pixels(&store, src)[0..4], [255, 0, 0, 255]);
    }

    #[test]
    fn dispatch_fails_closed() {
        let mut store = ImageStore::new();
        let unset = Handle::UNSET.to_wire();
        assert_eq!(dispatch(&mut store, Intrinsic::Grayscale, &[42]), unset);
        assert_eq!(dispatch(&mut store, Intrinsic::Grayscale, &[-1]), unset);
        assert_eq!(dispatch(&mut store, Intrinsic::Darken, &[unset, 3]), unset);
        assert_eq!(
            dispatch(&mut store, Intrinsic::BlankImage, &[0, 0, 0, 0, 0, 0]),
            unset
        );
        assert_eq!(dispatch(&mut store, Intrinsic::Grayscale, &[]), unset);
        assert!(store.is_empty());
    }

    #[test]
    fn dispatch_returns_new_handles() {
        let mut store = ImageStore::new();
        let src = quad(&mut store);
        let out = dispatch(&mut store, Intrinsic::InvertColor, &[src.to_wire()]);
        assert_eq!(out, 1);
    }
}
