//! Scene configuration read from YAML.
//!
//! Every field has a default, so an empty document (or no file at all) yields
//! the stock textured 25x25 grid viewed from `(0, 10, 30)`.

use crate::types::{Variant, ViewMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

/// Mouse-look tuning. Deltas are divided by 100 before these apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Scales the yaw/pitch contribution of a mouse delta.
    pub multiplier: f32,
    /// Added to the target shift on every mouse delta.
    pub adder: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            adder: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Cube Grid".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: Variant,
    pub view: ViewMode,
    pub projection: ProjectionConfig,
    pub look: LookConfig,
    pub window: WindowConfig,
    /// RGBA clear color.
    pub clear_color: [f32; 4],
    /// RGBA fill used by the flat variant.
    pub flat_color: [f32; 4],
    /// Draw the environment cube-map behind the grid.
    pub skybox: bool,
    /// Path to the asset manifest (JSON). Built-in defaults are used when absent.
    pub assets: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            view: ViewMode::default(),
            projection: ProjectionConfig::default(),
            look: LookConfig::default(),
            window: WindowConfig::default(),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            flat_color: [0.5, 1.0, 0.5, 1.0],
            skybox: false,
            assets: None,
        }
    }
}

impl SceneConfig {
    /// Read and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), variant = ?config.variant, "loaded scene config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document; treat it as all-defaults.
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        let positive = |v: f32| v > 0.0;
        if !(positive(p.fov_degrees) && p.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                p.fov_degrees
            )));
        }
        if !positive(p.near) {
            return Err(ConfigError::Invalid(format!(
                "near must be positive, got {}",
                p.near
            )));
        }
        if !positive(p.far - p.near) {
            return Err(ConfigError::Invalid(format!(
                "far ({}) must exceed near ({})",
                p.far, p.near
            )));
        }
        if !self.look.multiplier.is_finite() || !self.look.adder.is_finite() {
            return Err(ConfigError::Invalid("look tuning must be finite".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_stock_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.variant, Variant::Textured);
        assert_eq!(config.projection.fov_degrees, 60.0);
        assert_eq!(config.projection.near, 0.1);
        assert_eq!(config.projection.far, 200.0);
        assert_eq!(config.look.multiplier, 1.0);
        assert_eq!(config.look.adder, 0.0);
        assert!(!config.skybox);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        let config = SceneConfig::from_yaml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = SceneConfig::from_yaml_str("variant: flat\nlook:\n  multiplier: 2.5\n").unwrap();
        assert_eq!(config.variant, Variant::Flat);
        assert_eq!(config.look.multiplier, 2.5);
        assert_eq!(config.look.adder, 0.0);
        assert_eq!(config.projection, ProjectionConfig::default());
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let mut config = SceneConfig::default();
        config.view = ViewMode::Oriented;
        config.skybox = true;
        let text = config.to_yaml_string().unwrap();
        assert_eq!(SceneConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = SceneConfig::from_yaml_str("projection:\n  near: 10.0\n  far: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_degenerate_fov() {
        let err = SceneConfig::from_yaml_str("projection:\n  fov_degrees: 180.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_variant() {
        let err = SceneConfig::from_yaml_str("variant: wireframe\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "skybox: true").unwrap();
        let config = SceneConfig::load(tmp.path()).unwrap();
        assert!(config.skybox);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SceneConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
