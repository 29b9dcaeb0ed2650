//! Transformed primitive instances.

use lumen_math::{Mat3, Mat4, Vec3};

/// What shape a geom is. Mesh geoms address a range of the scene's flat
/// triangle pool; cubes and spheres are unit shapes in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Unit cube spanning `[-0.5, 0.5]^3` in object space.
    Cube,
    /// Sphere of radius 0.5 centered at the object-space origin.
    Sphere,
    /// Triangle range `[tri_start, tri_start + tri_count)`.
    Mesh { tri_start: u32, tri_count: u32 },
}

/// One instance in the scene: a primitive, its material, and the transform
/// triple used to move rays into object space and hits back out.
#[derive(Debug, Clone, Copy)]
pub struct Geom {
    pub primitive: Primitive,
    pub material_id: u32,
    /// Object-to-world transform.
    pub transform: Mat4,
    /// World-to-object transform.
    pub inverse: Mat4,
    /// Normal matrix: transpose of the inverse's rotation/scale block.
    pub inv_transpose: Mat3,
}

impl Geom {
    /// Build a geom from the scene-file transform components: translation,
    /// Euler XYZ rotation in degrees, and per-axis scale.
    pub fn new(
        primitive: Primitive,
        material_id: u32,
        translation: Vec3,
        rotation_degrees: Vec3,
        scale: Vec3,
    ) -> Self {
        let transform = build_transform(translation, rotation_degrees, scale);
        let inverse = transform.inverse();
        let inv_transpose = Mat3::from_mat4(inverse).transpose();

        Self {
            primitive,
            material_id,
            transform,
            inverse,
            inv_transpose,
        }
    }
}

/// Compose translation * Rx * Ry * Rz * scale, rotation angles in degrees.
pub fn build_transform(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotation_degrees.z.to_radians())
        * Mat4::from_scale(scale)
}
