//! Scene objects and viewpoints.
//!
//! This crate provides:
//! - [`Transform`] with YXZ Euler rotation
//! - [`GameObject`] placing shared meshes in the world
//! - [`Camera`] projection and view matrices
//! - [`KeyboardMovementController`] for a first-person viewer

pub mod camera;
pub mod controller;
pub mod game_object;
pub mod transform;

pub use camera::Camera;
pub use controller::{KeyMappings, KeyboardMovementController, PITCH_LIMIT};
pub use game_object::{GameObject, GameObjectId};
pub use transform::Transform;
