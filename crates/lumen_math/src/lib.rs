// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod ray;
pub mod rng;
pub mod sampling;

pub use aabb::Aabb;
pub use ray::Ray;

/// Shared intersection epsilon: degenerate tie-breaks and surface offsets.
pub const EPSILON: f32 = 1e-5;
