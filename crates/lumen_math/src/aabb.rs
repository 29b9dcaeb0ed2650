//! Axis-aligned bounding box for BVH construction and traversal.

use crate::{Ray, Vec3};

/// An AABB stored as min/max corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box (min > max, contains nothing). Growing it by any point
    /// or box yields that point or box.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The smallest box enclosing both boxes.
    pub fn union(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Extend this box to contain a point.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Center point of the box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Branchless slab test. Returns `(t_enter, t_exit)` along the ray;
    /// the box is hit iff `t_enter <= t_exit && t_exit >= 0`.
    #[inline]
    pub fn slab(&self, ray: &Ray) -> (f32, f32) {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);
        (t_near.max_element(), t_far.min_element())
    }

    /// Slab test collapsed to a hit/miss boolean.
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        let (t_enter, t_exit) = self.slab(ray);
        t_enter <= t_exit && t_exit >= 0.0
    }
}
