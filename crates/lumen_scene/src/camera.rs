//! Camera configuration as read from the scene file.

use lumen_math::Vec3;

/// The CAMERA record of a scene file. The renderer derives its orthonormal
/// basis and pixel extents from this at init.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub resolution: (u32, u32),
    /// Full vertical field of view in degrees.
    pub fovy_degrees: f32,
    pub iterations: u32,
    /// Maximum bounces per path.
    pub trace_depth: u32,
    /// Output image name from the FILE line.
    pub output_name: String,
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Lens radius; 0 means a pinhole camera.
    pub aperture_radius: f32,
    pub focal_length: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: (800, 800),
            fovy_degrees: 45.0,
            iterations: 1000,
            trace_depth: 8,
            output_name: String::from("render"),
            eye: Vec3::new(0.0, 5.0, 10.0),
            look_at: Vec3::new(0.0, 5.0, 0.0),
            up: Vec3::Y,
            aperture_radius: 0.0,
            focal_length: 1.0,
        }
    }
}
