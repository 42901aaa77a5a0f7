//! Intrinsic registry: signatures plus the prose the authoring UI shows.
//!
//! Signatures come from [`Intrinsic::params`]; this module adds descriptions
//! and usage examples, and renders signatures for diagnostics.

use coocoo_types::{Intrinsic, ValueKind};

/// Human-readable description of an intrinsic.
pub fn description(intrinsic: Intrinsic) -> &'static str {
    match intrinsic {
        Intrinsic::Resize => "Nearest-neighbour resample to new_width × new_height",
        Intrinsic::Darken => {
            "Subtract value from R, G and B, clamped to [0, 255]; a negative value brightens"
        }
        Intrinsic::BlankImage => "New width × height image filled with one RGBA colour",
        Intrinsic::Grayscale => "Replace R, G and B with luminance (0.299R + 0.587G + 0.114B)",
        Intrinsic::InvertColor => "255 minus each of R, G and B; alpha unchanged",
        Intrinsic::FlipHorizontal => "Mirror left to right",
        Intrinsic::FlipVertical => "Mirror top to bottom",
        Intrinsic::MaskChannelR => "Broadcast the red channel into R, G and B; alpha opaque",
        Intrinsic::MaskChannelG => "Broadcast the green channel into R, G and B; alpha opaque",
        Intrinsic::MaskChannelB => "Broadcast the blue channel into R, G and B; alpha opaque",
    }
}

/// A one-line script showing the intrinsic in use.
pub fn example(intrinsic: Intrinsic) -> &'static str {
    match intrinsic {
        Intrinsic::Resize => "small = resize(albedo, 256, 256);",
        Intrinsic::Darken => "shadow = darken(albedo, 40);",
        Intrinsic::BlankImage => "white = blank_image(255, 255, 255, 255, 512, 512);",
        Intrinsic::Grayscale => "rough = grayscale(albedo);",
        Intrinsic::InvertColor => "gloss = invert_color(rough);",
        Intrinsic::FlipHorizontal => "mirrored = flip_horizontal(albedo);",
        Intrinsic::FlipVertical => "upside = flip_vertical(albedo);",
        Intrinsic::MaskChannelR => "metal = mask_channel_r(packed);",
        Intrinsic::MaskChannelG => "rough = mask_channel_g(packed);",
        Intrinsic::MaskChannelB => "ao = mask_channel_b(packed);",
    }
}

/// `darken(image: image, value: number) -> image`
pub fn signature(intrinsic: Intrinsic) -> String {
    let params: Vec<String> = intrinsic
        .params()
        .iter()
        .map(|(name, kind)| format!("{name}: {kind}"))
        .collect();
    format!("{}({}) -> {}", intrinsic, params.join(", "), ValueKind::Image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_rendering() {
        assert_eq!(
            signature(Intrinsic::Darken),
            "darken(image: image, value: number) -> image"
        );
        assert_eq!(
            signature(Intrinsic::BlankImage),
            "blank_image(r: number, g: number, b: number, a: number, width: number, height: number) -> image"
        );
    }

    #[test]
    fn test_examples_call_their_intrinsic() {
        for intrinsic in Intrinsic::ALL {
            let call = format!("{}(", intrinsic.name());
            assert!(example(intrinsic).contains(&call), "{intrinsic}");
            assert!(!description(intrinsic).is_empty());
        }
    }
}
