//! Flat normal reconstruction for models that ship without `vn` data.

use glam::Vec3;

use crate::model::{Face, Model};

/// Computes one flat normal per face from its first three corners.
///
/// No-op (returns 0) when the model already has normals. Returns the number of
/// faces that received a normal.
pub fn reconstruct_flat_normals(model: &mut Model) -> usize {
    if !model.normals.is_empty() {
        return 0;
    }

    let positions = &model.positions;
    let mut computed = 0;
    for face in &mut model.faces {
        match face_normal(positions, face) {
            Some(normal) => {
                face.flat_normal = Some(normal);
                computed += 1;
            }
            None if face.len() >= 3 => {
                log::debug!("Face references a missing vertex; no normal computed");
            }
            None => {}
        }
    }
    computed
}

/// `(v2 - v1) x (v3 - v1)`, normalized unless it has zero length.
/// `None` for faces with fewer than 3 corners or out-of-range indices.
pub fn face_normal(positions: &[[f32; 3]], face: &Face) -> Option<[f32; 3]> {
    let mut corners = face.position_indices();
    let mut next = || {
        corners
            .next()
            .and_then(|i| positions.get(i))
            .map(|p| Vec3::from_array(*p))
    };
    let (v1, v2, v3) = (next()?, next()?, next()?);

    let n = (v2 - v1).cross(v3 - v1);
    let len = n.length();
    let n = if len > 0.0 { n / len } else { n };
    Some(n.to_array())
}
