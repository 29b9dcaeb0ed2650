//! Rendering core: a progressive, wavefront-style Monte Carlo path tracer.
//!
//! One [`Renderer`] owns everything a render needs: the read-only scene
//! arrays (geoms, triangles, BVH nodes, materials), the path and
//! intersection pools, and the running HDR image. Each
//! [`Renderer::render_iteration`] call traces one sample per pixel and folds
//! the result into the progressive mean.

mod bvh;
mod camera;
mod intersect;
mod path;
mod primitives;
mod renderer;
mod settings;
mod shade;

pub use camera::Camera;
pub use intersect::Intersection;
pub use path::PathSegment;
pub use renderer::{Renderer, RenderError};
pub use settings::RenderSettings;
