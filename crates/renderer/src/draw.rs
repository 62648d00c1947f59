//! CPU-side draw step: turns a [`Model`] into lit, triangulated geometry.
//!
//! Every index is bounds-checked; dangling material names fall back to the
//! default color.

use anyhow::{Result, anyhow};
use asset::{Face, Model};
use bytemuck::{Pod, Zeroable};
use wgpu::{VertexBufferLayout, VertexStepMode};

/// Normal used when a corner has neither an indexed nor a flat normal.
const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Vertex: position + normal + color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3],
    };
}

/// How a face's corners are assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Quads,
    TriangleFan,
}

impl Primitive {
    pub fn for_vertex_count(count: usize) -> Option<Self> {
        match count {
            0..=2 => None,
            3 => Some(Self::Triangles),
            4 => Some(Self::Quads),
            _ => Some(Self::TriangleFan),
        }
    }

    fn accepts(self, count: usize) -> bool {
        match self {
            Self::Triangles => count == 3,
            Self::Quads => count == 4,
            Self::TriangleFan => count >= 3,
        }
    }
}

/// One face, ready to be emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub color: [f32; 3],
    pub vertices: Vec<Vertex>,
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Builds one command per drawable face, in stored order.
pub fn build_draw_list(model: &Model, default_color: [f32; 3]) -> Vec<DrawCommand> {
    model
        .faces
        .iter()
        .filter_map(|face| face_command(model, face, default_color))
        .collect()
}

fn face_command(model: &Model, face: &Face, default_color: [f32; 3]) -> Option<DrawCommand> {
    let primitive = Primitive::for_vertex_count(face.len())?;
    let color = model.face_diffuse(face).unwrap_or(default_color);

    let vertices: Vec<Vertex> = face
        .vertices
        .iter()
        .filter_map(|corner| {
            let Some(pos) = model.positions.get(corner.position) else {
                log::debug!("Skipping corner with vertex index {}", corner.position);
                return None;
            };
            let normal = corner
                .normal
                .and_then(|i| model.normals.get(i))
                .copied()
                .or(face.flat_normal)
                .unwrap_or(DEFAULT_NORMAL);
            Some(Vertex {
                pos: *pos,
                normal,
                color,
            })
        })
        .collect();

    if !primitive.accepts(vertices.len()) {
        log::debug!(
            "Dropping {:?} face left with {} valid corners",
            primitive,
            vertices.len()
        );
        return None;
    }

    Some(DrawCommand {
        primitive,
        color,
        vertices,
    })
}

/// Concatenates commands into one triangle list. Quads and fans are split
/// around their first corner. Fails if the vertex count outgrows `u32` indices.
pub fn triangulate(commands: &[DrawCommand]) -> Result<MeshBuffers> {
    let mut out = MeshBuffers::default();
    for cmd in commands {
        let base = index_u32(out.vertices.len())?;
        let end = index_u32(out.vertices.len() + cmd.vertices.len())?;
        out.vertices.extend_from_slice(&cmd.vertices);
        for i in base + 1..end.saturating_sub(1) {
            out.indices.extend_from_slice(&[base, i, i + 1]);
        }
    }
    Ok(out)
}

fn index_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| anyhow!("Too many vertices for a u32 index buffer (>{})", u32::MAX))
}

/// [`build_draw_list`] followed by [`triangulate`].
pub fn build_mesh(model: &Model, default_color: [f32; 3]) -> Result<MeshBuffers> {
    triangulate(&build_draw_list(model, default_color))
}
