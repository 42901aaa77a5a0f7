//! Compiling the same source twice yields byte-identical output.

use coocoo_compiler::{compile, generate_intrinsic_table, generate_reference};
use coocoo_types::{Handle, InputImage};

/// Inputs as a freshly reset store registers them: handle `i` for name `i`.
fn inputs(names: &[&str]) -> Vec<InputImage> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| InputImage::new(*name, Handle(i as u32)))
        .collect()
}

const SOURCES: &[&str] = &[
    "a = grayscale(sky); export a;",
    "out = darken(sky, 10);\n(mat1, albedo, PBRMetalness) = out;",
    r#"
        g = blank_image(0, 0, 0, 255, 8, 8);
        (floor, diffuse, PBRMetalness) = flip_horizontal(g);
        (floor, ao, PBRMetalness) = mask_channel_r(resize(sky, 4, 4));
        (trim, specular, PBRSpecular) = mask_channel_g(sky);
        export g, sky;
    "#,
];

#[test]
fn modules_are_identical_across_compiles() {
    for source in SOURCES {
        let first = compile(source, &inputs(&["sky"])).expect("should compile");
        for _ in 0..10 {
            let again = compile(source, &inputs(&["sky"])).expect("should compile");
            assert_eq!(first, again, "non-deterministic output for {source:?}");
        }
    }
}

#[test]
fn diagnostics_are_identical_across_compiles() {
    let source = "a = blur(sky);\nb = darken(c, 1, 2);\n(m, x, Foo) = 3;\nsky = a;";
    let first = compile(source, &inputs(&["sky"])).unwrap_err().to_string();
    for _ in 0..10 {
        let again = compile(source, &inputs(&["sky"])).unwrap_err().to_string();
        assert_eq!(first, again);
    }
}

#[test]
fn reference_output_is_stable() {
    assert_eq!(generate_reference(), generate_reference());
    assert_eq!(generate_intrinsic_table(), generate_intrinsic_table());
}
