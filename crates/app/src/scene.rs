//! Builds the demo scene from configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use vista_core::SceneObjectConfig;
use vista_resources::{Mesh, MeshBuilder};
use vista_rhi::device::Device;
use vista_scene::{GameObject, Transform};

/// Loads each model path once and hands out shared references.
pub struct MeshCache {
    device: Arc<Device>,
    meshes: HashMap<PathBuf, Arc<Mesh>>,
}

impl MeshCache {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            meshes: HashMap::new(),
        }
    }

    /// Returns the mesh for `path`, loading and uploading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Mesh>> {
        if let Some(mesh) = self.meshes.get(path) {
            debug!("Reusing mesh {}", path.display());
            return Ok(Arc::clone(mesh));
        }

        let builder = MeshBuilder::from_obj_file(path)?;
        let mesh = Arc::new(
            Mesh::new(Arc::clone(&self.device), &builder)
                .with_context(|| format!("Failed to upload {}", path.display()))?,
        );
        self.meshes.insert(path.to_path_buf(), Arc::clone(&mesh));
        Ok(mesh)
    }
}

/// Objects split by the render system that draws them.
#[derive(Default)]
pub struct Scene {
    /// Drawn by the camera-relative 3D system.
    pub objects: Vec<GameObject>,
    /// Drawn by the object-space 2D system.
    pub flat_objects: Vec<GameObject>,
}

impl Scene {
    /// Creates one object per config entry, sharing meshes by path.
    pub fn from_config(configs: &[SceneObjectConfig], meshes: &mut MeshCache) -> Result<Self> {
        let mut scene = Self::default();
        for config in configs {
            let mut object = GameObject::with_model(meshes.get_or_load(&config.model)?);
            object.transform = transform_from_config(config);
            scene.push(object, config.flat);
        }
        Ok(scene)
    }

    /// Adds `object` to the list for its render system.
    pub fn push(&mut self, object: GameObject, flat: bool) {
        if flat {
            self.flat_objects.push(object);
        } else {
            self.objects.push(object);
        }
    }
}

pub fn transform_from_config(config: &SceneObjectConfig) -> Transform {
    Transform {
        translation: config.translation,
        scale: config.scale,
        rotation: config.rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_transform_from_config() {
        let config = SceneObjectConfig {
            model: PathBuf::from("data/models/flat_vase.obj"),
            translation: Vec3::new(-0.5, 0.5, 2.5),
            scale: Vec3::splat(3.0),
            rotation: Vec3::new(0.0, 0.3, 0.0),
            flat: false,
        };
        let t = transform_from_config(&config);
        assert_eq!(t.translation, Vec3::new(-0.5, 0.5, 2.5));
        assert_eq!(t.scale, Vec3::splat(3.0));
        assert_eq!(t.rotation.y, 0.3);
    }

    #[test]
    fn test_push_splits_by_system() {
        let mut scene = Scene::default();
        scene.push(GameObject::new(), false);
        scene.push(GameObject::new(), true);
        scene.push(GameObject::new(), false);

        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.flat_objects.len(), 1);
    }

    #[test]
    fn test_default_config_scene_layout() {
        let configs = vista_core::AppConfig::default().objects;
        let flat = configs.iter().filter(|c| c.flat).count();
        assert_eq!(flat, 1);
        assert_eq!(configs.len() - flat, 2);
    }
}
