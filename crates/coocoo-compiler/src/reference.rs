//! Machine-generated Coocoo reference and intrinsic table.
//!
//! Produces two artifacts from the intrinsic registry:
//! 1. **Script reference** (markdown) for the authoring UI's help panel
//! 2. **Intrinsic table** (JSON) for tooling and editor completion
//!
//! Both are generated, not hand-written, so they track the catalogue.

use coocoo_types::{Intrinsic, MaterialType, IMPORT_MODULE};
use serde::Serialize;

use crate::registry;

/// Generate the markdown script reference.
pub fn generate_reference() -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(REFERENCE_PREAMBLE);

    out.push_str("## Intrinsics\n\n");
    for intrinsic in Intrinsic::ALL {
        out.push_str(&format!(
            "- `{}`\n  {}\n  e.g. `{}`\n",
            registry::signature(intrinsic),
            registry::description(intrinsic),
            registry::example(intrinsic)
        ));
    }

    out.push_str("\n## Material types\n\n");
    for ty in MaterialType::KNOWN {
        out.push_str(&format!("- `{}`: {}\n", ty, ty.channels().join(", ")));
    }

    out
}

const REFERENCE_PREAMBLE: &str = r#"# Coocoo script reference

Scripts build material textures from input images. Statements end with `;`.
Comments: `// line` and `/* block */`.

```
name = intrinsic(arg, ...);              // bind a result (single assignment)
(material, channel, MaterialType) = x;   // route an image to a material channel
export a, b;                             // expose images as standalone textures
```

Arguments are input image names, earlier bindings, whole numbers or nested
calls. Images are referenced by handle; a failed operation yields no image and
the channels fed by it are left out of the export.

"#;

#[derive(Serialize)]
struct IntrinsicTable {
    version: &'static str,
    import_module: &'static str,
    intrinsics: Vec<IntrinsicEntry>,
    material_types: Vec<MaterialEntry>,
}

#[derive(Serialize)]
struct IntrinsicEntry {
    name: &'static str,
    /// Function index in every compiled module's import section.
    import_index: u32,
    signature: String,
    params: Vec<ParamEntry>,
    description: &'static str,
    example: &'static str,
}

#[derive(Serialize)]
struct ParamEntry {
    name: &'static str,
    kind: coocoo_types::ValueKind,
}

#[derive(Serialize)]
struct MaterialEntry {
    name: String,
    channels: &'static [&'static str],
}

/// Generate the structured intrinsic table as pretty-printed JSON.
pub fn generate_intrinsic_table() -> String {
    let table = IntrinsicTable {
        version: env!("CARGO_PKG_VERSION"),
        import_module: IMPORT_MODULE,
        intrinsics: Intrinsic::ALL
            .into_iter()
            .map(|intrinsic| IntrinsicEntry {
                name: intrinsic.name(),
                import_index: intrinsic.import_index(),
                signature: registry::signature(intrinsic),
                params: intrinsic
                    .params()
                    .iter()
                    .map(|&(name, kind)| ParamEntry { name, kind })
                    .collect(),
                description: registry::description(intrinsic),
                example: registry::example(intrinsic),
            })
            .collect(),
        material_types: MaterialType::KNOWN
            .into_iter()
            .map(|ty| MaterialEntry {
                name: ty.to_string(),
                channels: ty.channels(),
            })
            .collect(),
    };
    // Plain structs of strings and integers always serialise.
    serde_json::to_string_pretty(&table).unwrap_or_default()
}
