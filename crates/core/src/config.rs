//! Application configuration.
//!
//! Configuration is read from an optional TOML file. Missing files fall back
//! to [`AppConfig::default`], which reproduces the demo scene.
//!
//! ```toml
//! shader_dir = "shaders"
//! enable_validation = true
//!
//! [window]
//! width = 1280
//! height = 720
//! title = "Vista"
//!
//! [[objects]]
//! model = "data/models/smooth_vase.obj"
//! translation = [0.5, 0.5, 2.5]
//! scale = [2.0, 2.0, 2.0]
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Window settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial drawable width in pixels
    pub width: u32,
    /// Initial drawable height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Vista".to_string(),
        }
    }
}

/// One object placed in the scene at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectConfig {
    /// OBJ file with the mesh
    pub model: PathBuf,
    /// World-space translation
    #[serde(default)]
    pub translation: Vec3,
    /// Per-axis scale
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Euler angles in radians (yaw = y, pitch = x, roll = z)
    #[serde(default)]
    pub rotation: Vec3,
    /// Draw with the flat, object-space system instead of the camera-relative one
    #[serde(default)]
    pub flat: bool,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Top-level application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Enable Vulkan validation layers
    pub enable_validation: bool,
    /// Prefer MAILBOX presentation over FIFO when available
    pub prefer_mailbox: bool,
    /// Directory containing compiled SPIR-V shaders
    pub shader_dir: PathBuf,
    /// Objects loaded at startup
    pub objects: Vec<SceneObjectConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            enable_validation: cfg!(debug_assertions),
            prefer_mailbox: true,
            shader_dir: PathBuf::from("shaders"),
            objects: vec![
                SceneObjectConfig {
                    model: PathBuf::from("data/models/flat_vase.obj"),
                    translation: Vec3::new(-0.5, 0.5, 2.5),
                    scale: Vec3::splat(3.0),
                    rotation: Vec3::ZERO,
                    flat: false,
                },
                SceneObjectConfig {
                    model: PathBuf::from("data/models/smooth_vase.obj"),
                    translation: Vec3::new(0.5, 0.5, 2.5),
                    scale: Vec3::splat(2.0),
                    rotation: Vec3::ZERO,
                    flat: false,
                },
                SceneObjectConfig {
                    model: PathBuf::from("data/models/smooth_vase.obj"),
                    translation: Vec3::new(0.8, 0.8, 0.0),
                    scale: Vec3::splat(2.0),
                    rotation: Vec3::ZERO,
                    flat: true,
                },
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.objects.len(), 3);
        assert_eq!(config.objects.iter().filter(|o| o.flat).count(), 1);
        assert_eq!(config.objects[0].translation, Vec3::new(-0.5, 0.5, 2.5));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            prefer_mailbox = false

            [window]
            width = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "Vista");
        assert!(!config.prefer_mailbox);
        assert_eq!(config.objects.len(), 3);
    }

    #[test]
    fn test_object_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [[objects]]
            model = "cube.obj"
            translation = [0.0, 0.0, 2.5]
            "#,
        )
        .unwrap();

        assert_eq!(config.objects.len(), 1);
        let object = &config.objects[0];
        assert_eq!(object.model, PathBuf::from("cube.obj"));
        assert_eq!(object.translation, Vec3::new(0.0, 0.0, 2.5));
        assert_eq!(object.scale, Vec3::ONE);
        assert_eq!(object.rotation, Vec3::ZERO);
        assert!(!object.flat);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(AppConfig::from_toml_str("[window]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("definitely/not/here/vista.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
