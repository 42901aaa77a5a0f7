//! Material types carried through compilation as renderer metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow tag of a material instance.
///
/// The compiler only checks channel names against [`MaterialType::channels`];
/// an unrecognised tag is kept as [`MaterialType::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialType {
    PbrMetalness,
    PbrSpecular,
    UnityStandardSpecular,
    Unknown(String),
}

impl MaterialType {
    pub const KNOWN: [MaterialType; 3] = [
        MaterialType::PbrMetalness,
        MaterialType::PbrSpecular,
        MaterialType::UnityStandardSpecular,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag {
            "PBRMetalness" => MaterialType::PbrMetalness,
            "PBRSpecular" => MaterialType::PbrSpecular,
            "UnityStandardSpecular" => MaterialType::UnityStandardSpecular,
            other => MaterialType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MaterialType::PbrMetalness => "PBRMetalness",
            MaterialType::PbrSpecular => "PBRSpecular",
            MaterialType::UnityStandardSpecular => "UnityStandardSpecular",
            MaterialType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MaterialType::Unknown(_))
    }

    /// Channels the renderer expects for this workflow. Empty for unknown tags.
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            MaterialType::PbrMetalness => &[
                "diffuse",
                "metalness",
                "normal",
                "transparency",
                "roughness",
                "ao",
                "displacement",
                "emissive",
                "cavity",
                "subsurface_scattering",
            ],
            MaterialType::PbrSpecular => &[
                "albedo",
                "specular",
                "normal",
                "transparency",
                "glossiness",
                "ao",
                "displacement",
                "emissive",
                "cavity",
                "subsurface_scattering",
            ],
            MaterialType::UnityStandardSpecular => {
                &["albedo", "specular", "normal", "height", "ao", "emissive"]
            }
            MaterialType::Unknown(_) => &[],
        }
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.channels().contains(&channel)
    }
}

impl From<String> for MaterialType {
    fn from(tag: String) -> Self {
        MaterialType::parse(&tag)
    }
}

impl From<MaterialType> for String {
    fn from(ty: MaterialType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
