//! Triangle data and glTF mesh loading.

use std::path::Path;

use lumen_math::{Aabb, Vec3};

use crate::SceneError;

/// One mesh triangle in object space, with an optional per-vertex normal
/// set for smooth shading and a cached bounding box for BVH construction.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
    pub bounds: Aabb,
}

impl Triangle {
    pub fn new(positions: [Vec3; 3]) -> Self {
        Self {
            positions,
            normals: None,
            bounds: bounds_of(&positions),
        }
    }

    pub fn with_normals(positions: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        Self {
            positions,
            normals: Some(normals),
            bounds: bounds_of(&positions),
        }
    }

    /// Geometric face normal (unit length).
    pub fn face_normal(&self) -> Vec3 {
        let e1 = self.positions[1] - self.positions[0];
        let e2 = self.positions[2] - self.positions[0];
        e1.cross(e2).normalize()
    }

    pub fn centroid(&self) -> Vec3 {
        self.bounds.centroid()
    }
}

/// Axis-parallel triangles would produce zero-thickness boxes that slab
/// tests can miss, so every side gets a small pad.
fn bounds_of(positions: &[Vec3; 3]) -> Aabb {
    let min = positions[0].min(positions[1]).min(positions[2]);
    let max = positions[0].max(positions[1]).max(positions[2]);
    let pad = Vec3::splat(1e-4);
    Aabb::from_points(min - pad, max + pad)
}

/// Load every mesh primitive of a glTF file into one flat triangle list,
/// in object space, keeping vertex normals when the file provides them.
pub fn load_gltf(path: &Path) -> Result<Vec<Triangle>, SceneError> {
    let display = path.display().to_string();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| SceneError::Gltf {
        path: display.clone(),
        source,
    })?;

    let mut triangles = Vec::new();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<Vec3> = match reader.read_positions() {
                Some(iter) => iter.map(Vec3::from).collect(),
                None => continue,
            };
            let normals: Option<Vec<Vec3>> = reader
                .read_normals()
                .map(|iter| iter.map(Vec3::from).collect());

            let push = |triangles: &mut Vec<Triangle>, i0: usize, i1: usize, i2: usize| {
                let pos = [positions[i0], positions[i1], positions[i2]];
                match &normals {
                    Some(n) => triangles.push(Triangle::with_normals(pos, [n[i0], n[i1], n[i2]])),
                    None => triangles.push(Triangle::new(pos)),
                }
            };

            match reader.read_indices() {
                Some(indices) => {
                    let indices: Vec<u32> = indices.into_u32().collect();
                    for tri in indices.chunks_exact(3) {
                        push(
                            &mut triangles,
                            tri[0] as usize,
                            tri[1] as usize,
                            tri[2] as usize,
                        );
                    }
                }
                None => {
                    for i in (0..positions.len()).step_by(3) {
                        if i + 2 < positions.len() {
                            push(&mut triangles, i, i + 1, i + 2);
                        }
                    }
                }
            }
        }
    }

    if triangles.is_empty() {
        return Err(SceneError::EmptyMesh(display));
    }

    log::info!("loaded {} triangles from {}", triangles.len(), display);
    Ok(triangles)
}
