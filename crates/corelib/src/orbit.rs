//! Mouse-driven orbit/zoom state for the model viewer.

use crate::{Mat4, camera::Camera};

pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 20.0;
/// Degrees of rotation per pixel of drag.
pub const DRAG_SENSITIVITY: f32 = 0.5;
/// Distance change per wheel notch.
pub const ZOOM_STEP: f32 = 0.1;

/// Rotation angles are in degrees and stay within `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub distance: f32,
    last_cursor: Option<(f32, f32)>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            rotation_x: 20.0,
            rotation_y: 0.0,
            distance: 5.0,
            last_cursor: None,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_cursor.is_some()
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.last_cursor = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_cursor = None;
    }

    /// Rotates by the cursor delta since the last call. Returns `true` if the
    /// view changed (i.e. a drag is in progress).
    pub fn drag_to(&mut self, x: f32, y: f32) -> bool {
        let Some((last_x, last_y)) = self.last_cursor else {
            return false;
        };
        self.rotation_y = wrap_degrees(self.rotation_y + (x - last_x) * DRAG_SENSITIVITY);
        self.rotation_x = wrap_degrees(self.rotation_x + (y - last_y) * DRAG_SENSITIVITY);
        self.last_cursor = Some((x, y));
        true
    }

    /// Positive `delta` zooms in, negative zooms out. Returns `true` if the
    /// view changed.
    pub fn zoom(&mut self, delta: f32) -> bool {
        let before = self.distance;
        if delta > 0.0 {
            self.distance = (self.distance - ZOOM_STEP).max(MIN_DISTANCE);
        } else if delta < 0.0 {
            self.distance = (self.distance + ZOOM_STEP).min(MAX_DISTANCE);
        }
        self.distance != before
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        Camera::looking_at_origin(self.distance, aspect)
    }

    /// Rotation about X, then about Y, applied to the model.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_viewer_defaults() {
        let cam = OrbitCamera::new();
        assert_eq!(cam.rotation_x, 20.0);
        assert_eq!(cam.rotation_y, 0.0);
        assert_eq!(cam.distance, 5.0);
        assert!(!cam.is_dragging());
    }

    #[test]
    fn drag_rotates_by_half_a_degree_per_pixel() {
        let mut cam = OrbitCamera::new();
        assert!(!cam.drag_to(10.0, 10.0));
        cam.begin_drag(100.0, 100.0);
        assert!(cam.drag_to(120.0, 90.0));
        assert_eq!(cam.rotation_y, 10.0);
        assert_eq!(cam.rotation_x, 15.0);
        cam.end_drag();
        assert!(!cam.drag_to(500.0, 500.0));
        assert_eq!(cam.rotation_y, 10.0);
    }

    #[test]
    fn rotation_wraps_into_full_circle() {
        let mut cam = OrbitCamera::new();
        cam.begin_drag(0.0, 0.0);
        cam.drag_to(-40.0, -60.0);
        assert_eq!(cam.rotation_y, 340.0);
        assert_eq!(cam.rotation_x, 350.0);
        cam.drag_to(700.0, -60.0);
        assert_eq!(cam.rotation_y, 350.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::new();
        for _ in 0..200 {
            cam.zoom(1.0);
        }
        assert_eq!(cam.distance, MIN_DISTANCE);
        assert!(!cam.zoom(1.0));
        for _ in 0..400 {
            cam.zoom(-1.0);
        }
        assert_eq!(cam.distance, MAX_DISTANCE);
        assert!(!cam.zoom(0.0));
    }

    #[test]
    fn camera_sits_on_positive_z() {
        let cam = OrbitCamera::new().camera(4.0 / 3.0);
        assert_eq!(cam.eye.z, 5.0);
        assert!(cam.proj_view().to_cols_array().iter().all(|f| f.is_finite()));
    }
}
