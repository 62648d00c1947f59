use crate::{Mat4, Vec3, vec3};

/// Timer-driven rotation for the cube demo: one degree per tick about (1, 1, 0).
#[derive(Clone, Copy, Debug)]
pub struct Spin {
    /// Degrees, in `[0, 360)`.
    pub angle: f32,
    pub axis: Vec3,
    pub step: f32,
}

impl Spin {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            axis: vec3(1.0, 1.0, 0.0),
            step: 1.0,
        }
    }

    pub fn tick(&mut self) {
        self.angle += self.step;
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.axis.normalize_or(Vec3::Y), self.angle.to_radians())
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new()
    }
}
