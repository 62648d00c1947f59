//! Mouse input helpers.

use winit::event::MouseScrollDelta;

/// Pixels per wheel "line" on touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

/// Signed wheel movement in lines; positive means scrolling up (zoom in).
pub fn scroll_amount(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}
