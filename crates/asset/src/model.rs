//! CPU-side model representation produced by the OBJ/MTL loaders.

use std::{collections::HashMap, path::Path};

use crate::{normals, obj};

/// One face corner. Indices are 0-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(position: usize, tex_coord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            tex_coord,
            normal,
        }
    }
}

/// Polygon with 3 or more corners, stored untriangulated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub vertices: Vec<FaceVertex>,
    /// Material active when the face was declared.
    pub material: Option<String>,
    /// Set by [`normals::reconstruct_flat_normals`] when the model has no normals.
    pub flat_normal: Option<[f32; 3]>,
}

impl Face {
    pub fn new(vertices: Vec<FaceVertex>, material: Option<String>) -> Self {
        Self {
            vertices,
            material,
            flat_normal: None,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn position_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn tex_coord_indices(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.vertices.iter().map(|v| v.tex_coord)
    }

    pub fn normal_indices(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.vertices.iter().map(|v| v.normal)
    }
}

/// Surface properties from an MTL `newmtl` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    /// `Kd`
    pub diffuse: Option<[f32; 3]>,
    /// `Ka`
    pub ambient: Option<[f32; 3]>,
    /// `Ks`
    pub specular: Option<[f32; 3]>,
    /// `Ns`
    pub shininess: Option<f32>,
    /// `d`
    pub dissolve: Option<f32>,
}

/// Materials keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Diffuse color of `name`, if the material exists and defines one.
    pub fn diffuse(&self, name: &str) -> Option<[f32; 3]> {
        self.get(name).and_then(|m| m.diffuse)
    }

    /// Inserts an empty material, replacing any previous entry with that name.
    pub fn start(&mut self, name: &str) -> &mut Material {
        let slot = self.materials.entry(name.to_owned()).or_default();
        *slot = Material::default();
        slot
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    /// Merges `other` into `self`; later definitions win.
    pub fn extend(&mut self, other: MaterialLibrary) {
        self.materials.extend(other.materials);
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl std::ops::Index<&str> for MaterialLibrary {
    type Output = Material;

    fn index(&self, name: &str) -> &Material {
        &self.materials[name]
    }
}

/// Everything loaded from one OBJ file (plus its material libraries).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub faces: Vec<Face>,
    pub materials: MaterialLibrary,
}

impl Model {
    /// Loads `path`, logging every diagnostic, and reconstructs flat normals
    /// when the file has none. A missing or unreadable file yields an empty model.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut model = match obj::load_obj_from_path(path) {
            Ok(report) => report.into_value(),
            Err(err) => {
                log::error!("Failed to load model: {err}");
                return Self::default();
            }
        };
        let computed = normals::reconstruct_flat_normals(&mut model);
        if computed > 0 {
            log::info!("Computed flat normals for {computed} faces");
        }
        model
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }

    /// Diffuse color of the material referenced by `face`, if it resolves.
    pub fn face_diffuse(&self, face: &Face) -> Option<[f32; 3]> {
        face.material
            .as_deref()
            .and_then(|name| self.materials.diffuse(name))
    }
}
