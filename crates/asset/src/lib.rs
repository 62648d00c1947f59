//! Asset loading/parsers.
//! OBJ geometry + MTL materials into a [`Model`], flat normal reconstruction,
//! and the procedural cube used by the cube demo.

pub mod cube;
pub mod error;
pub mod model;
pub mod mtl;
pub mod normals;
pub mod obj;
mod parse;

pub use error::{Diagnostic, LineError, LoadError, LoadReport};
pub use model::{Face, FaceVertex, Material, MaterialLibrary, Model};
