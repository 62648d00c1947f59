//! Hard-coded cube used by the cube demo.

use crate::model::{Face, FaceVertex, Model};

/// Corner positions per face, counter-clockwise seen from outside.
const FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
    // front
    (
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        [0.0, 0.0, 1.0],
    ),
    // back
    (
        [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
        [0.0, 0.0, -1.0],
    ),
    // top
    (
        [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        [0.0, 1.0, 0.0],
    ),
    // bottom
    (
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
        [0.0, -1.0, 0.0],
    ),
    // right
    (
        [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        [1.0, 0.0, 0.0],
    ),
    // left
    (
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        [-1.0, 0.0, 0.0],
    ),
];

/// Cube of side 2 centered at the origin: 6 quads, 24 positions, one flat
/// normal per face.
pub fn cube_model() -> Model {
    let mut model = Model::default();
    for (corners, normal) in FACES {
        let base = model.positions.len();
        model.positions.extend(corners);
        let vertices = (base..base + 4)
            .map(|i| FaceVertex::new(i, None, None))
            .collect();
        let mut face = Face::new(vertices, None);
        face.flat_normal = Some(normal);
        model.faces.push(face);
    }
    model
}
