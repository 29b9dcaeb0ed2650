//! Nearest-hit dispatch across all scene geoms.

use lumen_math::{Ray, Vec3};
use lumen_scene::{Geom, Primitive, Triangle};

use crate::bvh::{self, BvhNode, INVALID_NODE};
use crate::primitives::{
    intersect_cube, intersect_sphere, object_space_ray, triangle_normal, PrimitiveHit,
};

/// Result of intersecting one path's ray with the scene. `t < 0` is a miss.
///
/// The normal always faces the incoming ray; `front_face` is false when the
/// ray struck the surface from inside, which the dielectric shader needs to
/// swap the relative index of refraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub normal: Vec3,
    pub material_id: u32,
    pub front_face: bool,
}

impl Intersection {
    pub const MISS: Intersection = Intersection {
        t: -1.0,
        normal: Vec3::ZERO,
        material_id: 0,
        front_face: true,
    };

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.t >= 0.0
    }
}

/// Borrowed view of the renderer's read-only scene arrays, shared by every
/// worker in the intersect stage.
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    pub geoms: &'a [Geom],
    /// BVH root per geom, `INVALID_NODE` for non-mesh geoms.
    pub mesh_roots: &'a [u32],
    pub triangles: &'a [Triangle],
    pub nodes: &'a [BvhNode],
}

/// Find the nearest hit along `ray` across every geom.
///
/// Smallest positive `t` wins; equal distances go to the lower geom index.
pub fn intersect_scene(view: &SceneView<'_>, ray: &Ray, enable_bvh: bool) -> Intersection {
    let mut best_t = f32::INFINITY;
    let mut best = Intersection::MISS;

    for (geom_index, geom) in view.geoms.iter().enumerate() {
        let hit = match geom.primitive {
            Primitive::Cube => intersect_cube(geom, ray),
            Primitive::Sphere => intersect_sphere(geom, ray),
            Primitive::Mesh {
                tri_start,
                tri_count,
            } => intersect_mesh(view, geom_index, geom, ray, tri_start, tri_count, enable_bvh),
        };

        if let Some(hit) = hit {
            if hit.t > 0.0 && hit.t < best_t {
                best_t = hit.t;
                best = Intersection {
                    t: hit.t,
                    normal: hit.normal,
                    material_id: geom.material_id,
                    front_face: hit.front_face,
                };
            }
        }
    }

    best
}

fn intersect_mesh(
    view: &SceneView<'_>,
    geom_index: usize,
    geom: &Geom,
    ray: &Ray,
    tri_start: u32,
    tri_count: u32,
    enable_bvh: bool,
) -> Option<PrimitiveHit> {
    let object_ray = object_space_ray(geom, ray);

    let root = view.mesh_roots[geom_index];
    let hit = if enable_bvh && root != INVALID_NODE {
        bvh::traverse(view.nodes, root, view.triangles, &object_ray)
    } else {
        bvh::linear_scan(view.triangles, tri_start, tri_count, &object_ray)
    }?;

    let tri = &view.triangles[hit.tri_index as usize];
    let object_point = object_ray.at(hit.t);

    // Triangles are one-sided data but meshes get hit from both sides;
    // report the ray-facing normal like the solid primitives do.
    let mut object_normal = triangle_normal(tri, hit.u, hit.v);
    let front_face = object_ray.direction.dot(object_normal) < 0.0;
    if !front_face {
        object_normal = -object_normal;
    }

    let world_point = geom.transform.transform_point3(object_point);
    Some(PrimitiveHit {
        t: (world_point - ray.origin).length(),
        normal: (geom.inv_transpose * object_normal).normalize(),
        front_face,
    })
}
