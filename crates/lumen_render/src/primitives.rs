//! Object-space primitive intersectors.
//!
//! Each routine transforms the world ray into the primitive's object space,
//! intersects the unit shape there, and maps the hit back out: the point
//! through the forward transform, the normal through the inverse-transpose.
//! Returned `t` is parametric along the world ray (whose direction is unit
//! length, so it equals the distance to the hit point).

use lumen_math::{Ray, Vec3, EPSILON};
use lumen_scene::{Geom, Triangle};

/// A world-space primitive hit. The normal always faces the incoming ray;
/// `front_face` records whether the outside of the surface was struck, which
/// the ray-facing normal alone cannot tell apart.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveHit {
    pub t: f32,
    pub normal: Vec3,
    pub front_face: bool,
}

/// Transform a world ray into a geom's object space. The direction is
/// re-normalised so object-space `t` stays metric there.
#[inline]
pub fn object_space_ray(geom: &Geom, ray: &Ray) -> Ray {
    Ray {
        origin: geom.inverse.transform_point3(ray.origin),
        direction: geom.inverse.transform_vector3(ray.direction).normalize(),
    }
}

/// Map an object-space hit back to world space.
#[inline]
fn world_hit(
    geom: &Geom,
    world_ray: &Ray,
    object_point: Vec3,
    object_normal: Vec3,
    front_face: bool,
) -> PrimitiveHit {
    let world_point = geom.transform.transform_point3(object_point);
    PrimitiveHit {
        t: (world_point - world_ray.origin).length(),
        normal: (geom.inv_transpose * object_normal).normalize(),
        front_face,
    }
}

/// Slab test against the unit cube `[-0.5, 0.5]^3`.
///
/// The entry face with the largest slab entry `t` decides the normal. A ray
/// starting inside the cube hits the exit face instead.
pub fn intersect_cube(geom: &Geom, ray: &Ray) -> Option<PrimitiveHit> {
    let q = object_space_ray(geom, ray);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;
    let mut exit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let origin = q.origin[axis];
        let dir = q.direction[axis];

        if dir.abs() > EPSILON {
            let t1 = (-0.5 - origin) / dir;
            let t2 = (0.5 - origin) / dir;
            let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

            let mut normal = Vec3::ZERO;
            normal[axis] = if t2 < t1 { 1.0 } else { -1.0 };

            if near > t_min {
                t_min = near;
                enter_normal = normal;
            }
            if far < t_max {
                t_max = far;
                // Inside hits report the inward-facing normal, like the
                // sphere's far-root case.
                exit_normal = normal;
            }
        } else if origin.abs() > 0.5 {
            // Parallel to this slab and outside it.
            return None;
        }
    }

    if t_max < t_min || t_max <= 0.0 {
        return None;
    }

    let (t, normal, front_face) = if t_min > 0.0 {
        (t_min, enter_normal, true)
    } else {
        (t_max, exit_normal, false)
    };

    Some(world_hit(geom, ray, q.at(t), normal, front_face))
}

/// Analytic quadratic against the object-space sphere of radius 0.5.
pub fn intersect_sphere(geom: &Geom, ray: &Ray) -> Option<PrimitiveHit> {
    const RADIUS: f32 = 0.5;
    let q = object_space_ray(geom, ray);

    let b_half = q.origin.dot(q.direction);
    let radicand = b_half * b_half - (q.origin.length_squared() - RADIUS * RADIUS);
    if radicand < 0.0 {
        return None;
    }

    let root = radicand.sqrt();
    let t1 = -b_half - root;
    let t2 = -b_half + root;

    let (t, outside) = if t2 <= 0.0 {
        // Both roots behind the origin.
        return None;
    } else if t1 > 0.0 {
        (t1, true)
    } else {
        (t2, false)
    };

    let object_point = q.at(t);
    let mut object_normal = object_point.normalize();
    if !outside {
        object_normal = -object_normal;
    }

    Some(world_hit(geom, ray, object_point, object_normal, outside))
}

/// Möller-Trumbore ray/triangle intersection.
///
/// Returns `(t, u, v)` with `t` parametric along `ray` (in whatever space
/// `ray` lives in) and `(u, v)` the barycentrics of vertices 1 and 2.
#[inline]
pub fn intersect_triangle(tri: &Triangle, ray: &Ray) -> Option<(f32, f32, f32)> {
    let edge1 = tri.positions[1] - tri.positions[0];
    let edge2 = tri.positions[2] - tri.positions[0];

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri.positions[0];
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if t <= EPSILON {
        return None;
    }

    Some((t, u, v))
}

/// Shading normal of a triangle hit: interpolated vertex normals when the
/// mesh has them, the geometric face normal otherwise.
#[inline]
pub fn triangle_normal(tri: &Triangle, u: f32, v: f32) -> Vec3 {
    match tri.normals {
        Some([n0, n1, n2]) => ((1.0 - u - v) * n0 + u * n1 + v * n2).normalize(),
        None => tri.face_normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_scene::Primitive;

    fn unit_geom(primitive: Primitive) -> Geom {
        Geom::new(primitive, 0, Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_cube_front_face() {
        let geom = unit_geom(Primitive::Cube);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let hit = intersect_cube(&geom, &ray).expect("ray aimed at cube");
        assert!((hit.t - 4.5).abs() < 1e-4, "t = {}", hit.t);
        assert!((hit.normal - Vec3::Z).length() < 1e-4, "n = {:?}", hit.normal);
        assert!(hit.front_face);
    }

    #[test]
    fn test_cube_from_inside_hits_exit_face() {
        let geom = unit_geom(Primitive::Cube);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = intersect_cube(&geom, &ray).expect("origin inside cube");
        assert!((hit.t - 0.5).abs() < 1e-4, "t = {}", hit.t);
        // Exit face normal points back toward the ray origin side.
        assert!((hit.normal - (-Vec3::X)).length() < 1e-4, "n = {:?}", hit.normal);
        assert!(!hit.front_face, "inside hit must not report a front face");
    }

    #[test]
    fn test_cube_miss_parallel_outside() {
        let geom = unit_geom(Primitive::Cube);
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), -Vec3::Z);

        assert!(intersect_cube(&geom, &ray).is_none());
    }

    #[test]
    fn test_cube_scaled_and_translated() {
        let geom = Geom::new(
            Primitive::Cube,
            0,
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::ZERO,
            Vec3::new(4.0, 4.0, 4.0),
        );
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let hit = intersect_cube(&geom, &ray).expect("hit scaled cube");
        assert!((hit.t - 8.0).abs() < 1e-3, "t = {}", hit.t);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_sphere_near_root() {
        let geom = unit_geom(Primitive::Sphere);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let hit = intersect_sphere(&geom, &ray).expect("ray aimed at sphere");
        assert!((hit.t - 4.5).abs() < 1e-4, "t = {}", hit.t);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!(hit.front_face);
    }

    #[test]
    fn test_sphere_inside_flips_normal() {
        let geom = unit_geom(Primitive::Sphere);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let hit = intersect_sphere(&geom, &ray).expect("origin inside sphere");
        assert!((hit.t - 0.5).abs() < 1e-4);
        // Normal reported against the surface, toward the inside.
        assert!((hit.normal - (-Vec3::Z)).length() < 1e-4, "n = {:?}", hit.normal);
        assert!(!hit.front_face, "inside hit must not report a front face");
    }

    #[test]
    fn test_sphere_behind_misses() {
        let geom = unit_geom(Primitive::Sphere);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        assert!(intersect_sphere(&geom, &ray).is_none());
    }

    #[test]
    fn test_sphere_nonuniform_scale_normal() {
        // Squashed sphere: normal at the +X pole must still point along +X.
        let geom = Geom::new(
            Primitive::Sphere,
            0,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(1.0, 3.0, 1.0),
        );
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::X);

        let hit = intersect_sphere(&geom, &ray).expect("hit ellipsoid");
        assert!((hit.t - 4.5).abs() < 1e-3, "t = {}", hit.t);
        assert!((hit.normal - Vec3::X).length() < 1e-3, "n = {:?}", hit.normal);
    }

    #[test]
    fn test_triangle_hit_and_barycentrics() {
        let tri = Triangle::new([
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let (t, u, v) = intersect_triangle(&tri, &ray).expect("ray aimed at triangle");
        assert!((t - 2.0).abs() < 1e-5);
        assert!(u > 0.0 && v > 0.0 && u + v < 1.0);
    }

    #[test]
    fn test_triangle_reject_outside() {
        let tri = Triangle::new([
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), -Vec3::Z);

        assert!(intersect_triangle(&tri, &ray).is_none());
    }

    #[test]
    fn test_triangle_reject_behind() {
        let tri = Triangle::new([
            Vec3::new(-1.0, -1.0, 2.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
        ]);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        assert!(intersect_triangle(&tri, &ray).is_none());
    }

    #[test]
    fn test_vertex_normal_interpolation() {
        let tri = Triangle::with_normals(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::Z, Vec3::X, Vec3::Y],
        );

        // At vertex 0 the interpolated normal is the vertex normal.
        let n = triangle_normal(&tri, 0.0, 0.0);
        assert!((n - Vec3::Z).length() < 1e-5);

        let n = triangle_normal(&tri, 1.0, 0.0);
        assert!((n - Vec3::X).length() < 1e-5);
    }
}
