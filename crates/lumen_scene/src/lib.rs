//! Scene description for the lumen path tracer.
//!
//! Everything the renderer consumes is plain data built once at load time:
//! a material table, transformed primitive instances, a flat triangle pool
//! for meshes, and the camera configuration.

mod camera;
mod error;
mod geom;
mod material;
mod mesh;
mod parser;

pub use camera::CameraConfig;
pub use error::SceneError;
pub use geom::{Geom, Primitive};
pub use material::Material;
pub use mesh::{load_gltf, Triangle};
pub use parser::{load_scene, parse_scene};

/// A complete scene: what `lumen_render::Renderer::new` takes as input.
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    pub materials: Vec<Material>,
    pub geoms: Vec<Geom>,
    /// Object-space triangles for all mesh geoms, addressed by each geom's
    /// `Primitive::Mesh { tri_start, tri_count }` range.
    pub triangles: Vec<Triangle>,
    pub camera: CameraConfig,
}
