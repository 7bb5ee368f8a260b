//! Renderable scene objects.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3;
use vista_resources::Mesh;

use crate::transform::Transform;

/// Unique identifier of a [`GameObject`].
pub type GameObjectId = u32;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// An object in the scene: an optional shared mesh placed by a transform.
///
/// Objects are not `Clone`; each one owns a unique id. Meshes are shared
/// through `Arc`, so dropping one object never frees geometry another
/// object still draws.
#[derive(Debug)]
pub struct GameObject {
    id: GameObjectId,
    /// Geometry to draw, `None` for viewer or marker objects
    pub model: Option<Arc<Mesh>>,
    /// Flat color, used when the mesh carries none
    pub color: Vec3,
    /// Placement in the world
    pub transform: Transform,
}

impl GameObject {
    /// Creates an empty object with the next process-wide id.
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            model: None,
            color: Vec3::ZERO,
            transform: Transform::default(),
        }
    }

    /// Creates an object drawing `mesh`.
    pub fn with_model(mesh: Arc<Mesh>) -> Self {
        Self {
            model: Some(mesh),
            ..Self::new()
        }
    }

    /// Returns the object's id.
    #[inline]
    pub fn id(&self) -> GameObjectId {
        self.id
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = GameObject::new();
        let b = GameObject::new();
        let c = GameObject::default();
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_new_object_is_empty() {
        let object = GameObject::new();
        assert!(object.model.is_none());
        assert_eq!(object.color, Vec3::ZERO);
        assert_eq!(object.transform, Transform::default());
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..64).map(|_| GameObject::new().id()).collect::<Vec<_>>()))
            .collect();

        let mut ids: Vec<GameObjectId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
