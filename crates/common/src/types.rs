use serde::{Deserialize, Serialize};

/// Rendering variant. Selects cube shading and the default camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Cubes sampled from the cube texture.
    #[default]
    Textured,
    /// Cubes filled with a single flat color.
    Flat,
}

impl Variant {
    pub fn is_textured(self) -> bool {
        matches!(self, Variant::Textured)
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "textured" => Ok(Variant::Textured),
            "flat" => Ok(Variant::Flat),
            other => Err(format!("unknown variant '{other}' (expected textured or flat)")),
        }
    }
}

/// Which camera matrix the render loop composes per-cube transforms with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Plain look-at from eye to target.
    #[default]
    LookAt,
    /// Look-at composed with the fixed yaw offset and accumulated yaw/pitch.
    Oriented,
}
