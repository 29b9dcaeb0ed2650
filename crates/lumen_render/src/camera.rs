//! Derived camera and ray generation.

use lumen_math::sampling::concentric_sample_disk;
use lumen_math::{Ray, Vec2, Vec3};
use lumen_scene::CameraConfig;
use rand::Rng;

/// Render-ready camera derived from a [`CameraConfig`]: an orthonormal
/// right-handed `{right, up, view}` frame plus the per-pixel angular
/// extents used to aim rays.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub view: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub width: u32,
    pub height: u32,
    pub pixel_length: Vec2,
    pub aperture_radius: f32,
    pub focal_length: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let (width, height) = config.resolution;

        let view = (config.look_at - config.eye).normalize();
        let right = view.cross(config.up.normalize()).normalize();
        // Re-derive up so the frame is orthonormal even when the scene file's
        // up vector is not exactly perpendicular to the view direction.
        let up = right.cross(view);

        let y_extent = (0.5 * config.fovy_degrees.to_radians()).tan();
        let x_extent = y_extent * width as f32 / height as f32;
        let pixel_length = Vec2::new(
            2.0 * x_extent / width as f32,
            2.0 * y_extent / height as f32,
        );

        Self {
            position: config.eye,
            view,
            up,
            right,
            width,
            height,
            pixel_length,
            aperture_radius: config.aperture_radius,
            focal_length: config.focal_length,
        }
    }

    /// Generate the camera ray for pixel `(x, y)`.
    ///
    /// With `jitter` the sample point is uniform over the pixel footprint
    /// (anti-aliasing); without it the ray is deterministic so first-bounce
    /// caching stays valid. A non-zero aperture switches to the thin-lens
    /// model: the origin moves to a sampled lens point and the direction is
    /// re-aimed through the focal point of the original ray.
    pub fn generate_ray(&self, x: u32, y: u32, jitter: bool, rng: &mut impl Rng) -> Ray {
        let (jx, jy): (f32, f32) = if jitter {
            (rng.gen(), rng.gen())
        } else {
            (0.0, 0.0)
        };

        let direction = (self.view
            - self.right
                * self.pixel_length.x
                * (x as f32 + jx - 0.5 * self.width as f32)
            - self.up
                * self.pixel_length.y
                * (y as f32 + jy - 0.5 * self.height as f32))
            .normalize();

        if self.aperture_radius <= 0.0 {
            return Ray::new(self.position, direction);
        }

        let focal_t = self.focal_length * self.view.dot(self.view) / direction.dot(self.view);
        let focal_point = self.position + focal_t * direction;

        let (lens_x, lens_y) = concentric_sample_disk(rng.gen(), rng.gen());
        let lens_point = self.position
            + self.right * (lens_x * self.aperture_radius)
            + self.up * (lens_y * self.aperture_radius);

        Ray::new(lens_point, (focal_point - lens_point).normalize())
    }
}
