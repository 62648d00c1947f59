//! Core types: math re-exports, Camera, orbit controls and the cube spin.

pub use glam::{Mat4, Vec3, vec3};

pub mod camera;
pub mod orbit;
pub mod transform;

pub use camera::Camera;
pub use orbit::OrbitCamera;
pub use transform::Spin;
